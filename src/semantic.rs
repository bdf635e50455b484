//! Field-name classification and realistic value synthesis.
//!
//! [`classify`] maps a property name such as `email_address` or `ownerId`
//! to a [`SemanticType`] using an ordered rule table: the first matching
//! rule wins, so narrower rules are declared before broader ones
//! (`first_name` before `name`, `ip_address` before `address`).
//!
//! Values are produced by a [`DataProvider`]. [`FakerProvider`] is the
//! default and is backed by the `fake` crate; callers can inject their own.

use std::sync::OnceLock;

use fake::faker::address::en::{
    BuildingNumber, CityName, CountryName, StateName, StreetName, ZipCode,
};
use fake::faker::company::en::CompanyName;
use fake::faker::creditcard::en::CreditCardNumber;
use fake::faker::currency::en::CurrencyCode;
use fake::faker::internet::en::{DomainSuffix, Password, SafeEmail, UserAgent, Username, IPv4};
use fake::faker::lorem::en::{Sentence, Word, Words};
use fake::faker::name::en::{FirstName, LastName, Name};
use fake::faker::phone_number::en::PhoneNumber;
use fake::Fake;
use heck::ToSnakeCase;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use regex::Regex;
use serde_json::Value;

/// Realistic-data category inferred from a field name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SemanticType {
    Id,
    FirstName,
    LastName,
    FullName,
    Username,
    Email,
    Phone,
    Password,
    StreetAddress,
    City,
    State,
    ZipCode,
    Country,
    Url,
    Title,
    Description,
    Company,
    JobTitle,
    Price,
    Amount,
    Quantity,
    Age,
    Rating,
    CreatedAt,
    UpdatedAt,
    Timestamp,
    BirthDate,
    Avatar,
    Image,
    Color,
    Status,
    Category,
    Tag,
    Slug,
    Sku,
    Isbn,
    Latitude,
    Longitude,
    Currency,
    Language,
    Timezone,
    IpAddress,
    UserAgent,
    CreditCard,
    Gender,
    Unknown,
}

/// Classification rules in priority order. Patterns run against the
/// normalized (snake_case, lowercase) name.
const RULES: &[(&str, SemanticType)] = &[
    (r"^(?:id|uuid|guid)$|_(?:id|uuid|guid)$", SemanticType::Id),
    (r"(?:^|_)e?mail(?:$|_)", SemanticType::Email),
    (r"(?:^|_)(?:ip(?:_?address)?|ip_?v[46]|client_ip|remote_addr)(?:$|_)", SemanticType::IpAddress),
    (r"(?:^|_)user_?agent(?:$|_)", SemanticType::UserAgent),
    (r"(?:^|_)(?:user_?name|screen_name|nickname|handle)(?:$|_)", SemanticType::Username),
    (r"(?:^|_)(?:password|passwd|pwd|secret)(?:$|_)", SemanticType::Password),
    (r"(?:^|_)(?:first_?name|given_name|forename)(?:$|_)", SemanticType::FirstName),
    (r"(?:^|_)(?:last_?name|surname|family_name)(?:$|_)", SemanticType::LastName),
    (r"(?:^|_)(?:company|organi[sz]ation|employer|business_name)(?:$|_)", SemanticType::Company),
    (r"(?:^|_)(?:job_?title|occupation|position)(?:$|_)", SemanticType::JobTitle),
    (r"(?:^|_)(?:avatar|profile_(?:pic|picture|photo|image))(?:$|_)", SemanticType::Avatar),
    (r"(?:^|_)(?:image|img|photo|picture|thumbnail|logo|banner)(?:$|_)", SemanticType::Image),
    (r"(?:^|_)(?:url|uri|link|website|homepage|href)(?:$|_)", SemanticType::Url),
    (r"(?:^|_)(?:credit_?card|card_number|cc_number)(?:$|_)", SemanticType::CreditCard),
    (r"(?:^|_)(?:phone|mobile|cell|telephone|tel|fax)(?:$|_)", SemanticType::Phone),
    (r"(?:^|_)(?:street|address|addr)(?:$|_)", SemanticType::StreetAddress),
    (r"(?:^|_)(?:city|town)(?:$|_)", SemanticType::City),
    (r"(?:^|_)(?:state|province|region)(?:$|_)", SemanticType::State),
    (r"(?:^|_)(?:zip|zip_?code|postal_?code|postcode)(?:$|_)", SemanticType::ZipCode),
    (r"(?:^|_)(?:country|nation)(?:$|_)", SemanticType::Country),
    (r"(?:^|_)lat(?:itude)?(?:$|_)", SemanticType::Latitude),
    (r"(?:^|_)(?:lng|lon|longitude)(?:$|_)", SemanticType::Longitude),
    (r"(?:^|_)created(?:_at|_on|_date)?$", SemanticType::CreatedAt),
    (r"(?:^|_)(?:updated|modified|last_modified)(?:_at|_on|_date)?$", SemanticType::UpdatedAt),
    (r"(?:^|_)(?:birth_?date|birthday|dob|date_of_birth)(?:$|_)", SemanticType::BirthDate),
    (r"_(?:at|on)$|(?:^|_)(?:date|time|timestamp|datetime)$", SemanticType::Timestamp),
    (r"(?:^|_)age$", SemanticType::Age),
    (r"(?:^|_)(?:price|cost|fee|msrp)(?:$|_)", SemanticType::Price),
    (r"(?:^|_)(?:amount|total|subtotal|balance|salary|revenue)(?:$|_)", SemanticType::Amount),
    (r"(?:^|_)(?:quantity|qty|count|stock|inventory)(?:$|_)", SemanticType::Quantity),
    (r"(?:^|_)(?:rating|score|stars)(?:$|_)", SemanticType::Rating),
    (r"(?:^|_)currency(?:$|_)", SemanticType::Currency),
    (r"(?:^|_)(?:language|lang|locale)(?:$|_)", SemanticType::Language),
    (r"(?:^|_)(?:time_?zone|tz)(?:$|_)", SemanticType::Timezone),
    (r"(?:^|_)(?:colou?r|hex_colou?r)(?:$|_)", SemanticType::Color),
    (r"(?:^|_)(?:status|stage|phase)(?:$|_)", SemanticType::Status),
    (r"(?:^|_)(?:category|categories|genre|department)(?:$|_)", SemanticType::Category),
    (r"(?:^|_)(?:tags?|label|keyword)(?:$|_)", SemanticType::Tag),
    (r"(?:^|_)(?:slug|permalink)(?:$|_)", SemanticType::Slug),
    (r"(?:^|_)(?:sku|product_code|item_code|part_number)(?:$|_)", SemanticType::Sku),
    (r"(?:^|_)isbn(?:_?1[03])?(?:$|_)", SemanticType::Isbn),
    (r"(?:^|_)(?:title|headline|subject|heading|caption)(?:$|_)", SemanticType::Title),
    (
        r"(?:^|_)(?:description|desc|summary|bio|about|content|body|notes?|comment|details)(?:$|_)",
        SemanticType::Description,
    ),
    (r"(?:^|_)(?:gender|sex)(?:$|_)", SemanticType::Gender),
    (r"(?:^|_)(?:full_?name|display_name|name|author)(?:$|_)", SemanticType::FullName),
];

fn compiled_rules() -> &'static [(Regex, SemanticType)] {
    static COMPILED: OnceLock<Vec<(Regex, SemanticType)>> = OnceLock::new();
    COMPILED.get_or_init(|| {
        RULES
            .iter()
            .filter_map(|(pattern, semantic)| Regex::new(pattern).ok().map(|re| (re, *semantic)))
            .collect()
    })
}

/// Classify a field name. Pure: the same name always yields the same type.
pub fn classify(field_name: &str) -> SemanticType {
    let normalized = normalize(field_name);
    if normalized.is_empty() {
        return SemanticType::Unknown;
    }
    compiled_rules()
        .iter()
        .find(|(re, _)| re.is_match(&normalized))
        .map_or(SemanticType::Unknown, |(_, semantic)| *semantic)
}

/// Lowercase snake_case form of a field name (`ownerId` -> `owner_id`,
/// `HTTPStatus` -> `http_status`, `Email-Address` -> `email_address`).
fn normalize(name: &str) -> String {
    name.to_snake_case()
}

/// Source of realistic values for semantic types and filler words.
pub trait DataProvider {
    /// A realistic value for the given type. Numeric types yield numbers.
    fn semantic_value(&self, semantic: SemanticType, rng: &mut dyn RngCore) -> Value;

    /// A single lowercase filler word.
    fn word(&self, rng: &mut dyn RngCore) -> String;
}

/// Default provider backed by the `fake` crate's English locale.
#[derive(Debug, Clone, Copy, Default)]
pub struct FakerProvider;

const JOB_TITLES: &[&str] = &[
    "Software Engineer",
    "Product Manager",
    "Data Analyst",
    "Account Executive",
    "Designer",
    "Support Specialist",
    "Operations Lead",
];
const STATUSES: &[&str] = &["active", "inactive", "pending", "archived", "suspended"];
const CATEGORIES: &[&str] = &[
    "electronics",
    "books",
    "clothing",
    "home",
    "sports",
    "toys",
    "grocery",
];
const LANGUAGES: &[&str] = &["en", "es", "fr", "de", "it", "pt", "ja", "zh"];
const TIMEZONES: &[&str] = &[
    "UTC",
    "America/New_York",
    "America/Los_Angeles",
    "Europe/London",
    "Europe/Berlin",
    "Asia/Tokyo",
    "Australia/Sydney",
];
const GENDERS: &[&str] = &["female", "male", "non-binary"];

impl DataProvider for FakerProvider {
    fn semantic_value(&self, semantic: SemanticType, rng: &mut dyn RngCore) -> Value {
        let text = match semantic {
            SemanticType::Id => uuid_v4(rng),
            SemanticType::FirstName => FirstName().fake_with_rng(rng),
            SemanticType::LastName => LastName().fake_with_rng(rng),
            SemanticType::FullName => Name().fake_with_rng(rng),
            SemanticType::Username => Username().fake_with_rng(rng),
            SemanticType::Email => SafeEmail().fake_with_rng(rng),
            SemanticType::Phone => PhoneNumber().fake_with_rng(rng),
            SemanticType::Password => Password(10..17).fake_with_rng(rng),
            SemanticType::StreetAddress => {
                let number: String = BuildingNumber().fake_with_rng(rng);
                let street: String = StreetName().fake_with_rng(rng);
                format!("{number} {street}")
            }
            SemanticType::City => CityName().fake_with_rng(rng),
            SemanticType::State => StateName().fake_with_rng(rng),
            SemanticType::ZipCode => ZipCode().fake_with_rng(rng),
            SemanticType::Country => CountryName().fake_with_rng(rng),
            SemanticType::Url => {
                let host: String = Word().fake_with_rng(rng);
                let suffix: String = DomainSuffix().fake_with_rng(rng);
                format!("https://www.{host}.{suffix}")
            }
            SemanticType::Title => {
                let words: Vec<String> = Words(2..5).fake_with_rng(rng);
                words
                    .iter()
                    .map(|w| crate::inflect::capitalize(w))
                    .collect::<Vec<_>>()
                    .join(" ")
            }
            SemanticType::Description => Sentence(6..14).fake_with_rng(rng),
            SemanticType::Company => CompanyName().fake_with_rng(rng),
            SemanticType::JobTitle => pick(JOB_TITLES, rng),
            SemanticType::Price | SemanticType::Amount => {
                let cents: i64 = rng.gen_range(100..100_000);
                return Value::from(cents as f64 / 100.0);
            }
            SemanticType::Quantity => return Value::from(rng.gen_range(0..500_i64)),
            SemanticType::Age => return Value::from(rng.gen_range(18..90_i64)),
            SemanticType::Rating => return Value::from(rng.gen_range(1..=5_i64)),
            SemanticType::CreatedAt | SemanticType::UpdatedAt | SemanticType::Timestamp => {
                random_datetime(rng)
            }
            SemanticType::BirthDate => random_date(rng, 1950, 2005),
            SemanticType::Avatar => format!("https://i.pravatar.cc/150?u={}", uuid_v4(rng)),
            SemanticType::Image => {
                let seed: String = Word().fake_with_rng(rng);
                format!("https://picsum.photos/seed/{seed}/640/480")
            }
            SemanticType::Color => format!("#{:06x}", rng.gen_range(0..0x100_0000_u32)),
            SemanticType::Status => pick(STATUSES, rng),
            SemanticType::Category => pick(CATEGORIES, rng),
            SemanticType::Tag => Word().fake_with_rng(rng),
            SemanticType::Slug => {
                let words: Vec<String> = Words(2..4).fake_with_rng(rng);
                words.join("-").to_lowercase()
            }
            SemanticType::Sku => {
                let letters: String = (0..3)
                    .map(|_| char::from(rng.gen_range(b'A'..=b'Z')))
                    .collect();
                format!("SKU-{letters}-{:04}", rng.gen_range(0..10_000))
            }
            SemanticType::Isbn => format!(
                "978-{}-{:05}-{:03}-{}",
                rng.gen_range(0..10),
                rng.gen_range(0..100_000),
                rng.gen_range(0..1_000),
                rng.gen_range(0..10)
            ),
            SemanticType::Latitude => return Value::from(round6(rng.gen_range(-90.0..90.0))),
            SemanticType::Longitude => return Value::from(round6(rng.gen_range(-180.0..180.0))),
            SemanticType::Currency => CurrencyCode().fake_with_rng(rng),
            SemanticType::Language => pick(LANGUAGES, rng),
            SemanticType::Timezone => pick(TIMEZONES, rng),
            SemanticType::IpAddress => IPv4().fake_with_rng(rng),
            SemanticType::UserAgent => UserAgent().fake_with_rng(rng),
            SemanticType::CreditCard => CreditCardNumber().fake_with_rng(rng),
            SemanticType::Gender => pick(GENDERS, rng),
            SemanticType::Unknown => self.word(rng),
        };
        Value::String(text)
    }

    fn word(&self, rng: &mut dyn RngCore) -> String {
        let word: String = Word().fake_with_rng(rng);
        word.to_lowercase()
    }
}

/// Produce one value for a semantic type with the default provider.
pub fn generate_by_semantic_type(semantic: SemanticType, rng: &mut dyn RngCore) -> Value {
    FakerProvider.semantic_value(semantic, rng)
}

fn pick(options: &[&str], rng: &mut dyn RngCore) -> String {
    options.choose(rng).copied().unwrap_or_default().to_string()
}

fn round6(x: f64) -> f64 {
    (x * 1e6).round() / 1e6
}

/// RFC 4122 version 4 UUID drawn from the given RNG.
pub(crate) fn uuid_v4(rng: &mut dyn RngCore) -> String {
    let mut bytes = [0u8; 16];
    rng.fill_bytes(&mut bytes);
    uuid::Builder::from_random_bytes(bytes)
        .into_uuid()
        .hyphenated()
        .to_string()
}

/// RFC 3339 UTC timestamp between 2020 and 2025.
pub(crate) fn random_datetime(rng: &mut dyn RngCore) -> String {
    // 2020-01-01T00:00:00Z .. 2026-01-01T00:00:00Z
    let secs = rng.gen_range(1_577_836_800_i64..1_767_225_600);
    chrono::DateTime::from_timestamp(secs, 0)
        .map(|dt| dt.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
        .unwrap_or_else(|| "2024-01-01T00:00:00Z".to_string())
}

/// `YYYY-MM-DD` date with a year in `[from, to)`.
pub(crate) fn random_date(rng: &mut dyn RngCore, from: i32, to: i32) -> String {
    let year = rng.gen_range(from..to);
    let month = rng.gen_range(1..=12);
    let day = rng.gen_range(1..=28);
    format!("{year:04}-{month:02}-{day:02}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn classifies_ids() {
        assert_eq!(classify("id"), SemanticType::Id);
        assert_eq!(classify("user_id"), SemanticType::Id);
        assert_eq!(classify("ownerId"), SemanticType::Id);
        assert_eq!(classify("paid"), SemanticType::Unknown);
    }

    #[test]
    fn narrow_rules_win_over_broad_ones() {
        assert_eq!(classify("email_address"), SemanticType::Email);
        assert_eq!(classify("ip_address"), SemanticType::IpAddress);
        assert_eq!(classify("address"), SemanticType::StreetAddress);
        assert_eq!(classify("first_name"), SemanticType::FirstName);
        assert_eq!(classify("lastName"), SemanticType::LastName);
        assert_eq!(classify("company_name"), SemanticType::Company);
        assert_eq!(classify("username"), SemanticType::Username);
        assert_eq!(classify("name"), SemanticType::FullName);
        assert_eq!(classify("job_title"), SemanticType::JobTitle);
        assert_eq!(classify("title"), SemanticType::Title);
        assert_eq!(classify("avatar_url"), SemanticType::Avatar);
        assert_eq!(classify("website"), SemanticType::Url);
        assert_eq!(classify("created_at"), SemanticType::CreatedAt);
        assert_eq!(classify("published_at"), SemanticType::Timestamp);
    }

    #[test]
    fn token_boundaries_prevent_substring_hits() {
        assert_eq!(classify("template"), SemanticType::Unknown);
        assert_eq!(classify("discount"), SemanticType::Unknown);
        assert_eq!(classify("mailing_list"), SemanticType::Unknown);
    }

    #[test]
    fn classifies_geo_and_commerce() {
        assert_eq!(classify("lat"), SemanticType::Latitude);
        assert_eq!(classify("longitude"), SemanticType::Longitude);
        assert_eq!(classify("unit_price"), SemanticType::Price);
        assert_eq!(classify("sku"), SemanticType::Sku);
        assert_eq!(classify("isbn13"), SemanticType::Isbn);
        assert_eq!(classify("currency"), SemanticType::Currency);
        assert_eq!(classify("timezone"), SemanticType::Timezone);
    }

    #[test]
    fn unknown_names() {
        assert_eq!(classify("xyz123"), SemanticType::Unknown);
        assert_eq!(classify(""), SemanticType::Unknown);
    }

    #[test]
    fn classification_is_stable() {
        for name in ["email", "user_id", "status", "xyz123", "ZipCode"] {
            assert_eq!(classify(name), classify(name));
        }
    }

    #[test]
    fn every_rule_compiles() {
        assert_eq!(compiled_rules().len(), RULES.len());
    }

    #[test]
    fn normalize_handles_case_and_separators() {
        assert_eq!(normalize("ownerId"), "owner_id");
        assert_eq!(normalize("Email-Address"), "email_address");
        assert_eq!(normalize("zipCode2"), "zip_code2");
        assert_eq!(normalize("snake_case"), "snake_case");
        assert_eq!(normalize("XMLUrl"), "xml_url");
        assert_eq!(normalize("billing.address line"), "billing_address_line");
    }

    #[test]
    fn acronym_runs_split_into_words() {
        assert_eq!(classify("HTTPStatus"), SemanticType::Status);
        assert_eq!(classify("XMLUrl"), SemanticType::Url);
        assert_eq!(classify("ownerID"), SemanticType::Id);
    }

    #[test]
    fn provider_values_have_expected_shapes() {
        let mut rng = StdRng::seed_from_u64(7);
        let provider = FakerProvider;

        let email = provider.semantic_value(SemanticType::Email, &mut rng);
        assert!(email.as_str().unwrap().contains('@'));

        let id = provider.semantic_value(SemanticType::Id, &mut rng);
        assert!(uuid::Uuid::parse_str(id.as_str().unwrap()).is_ok());

        let color = provider.semantic_value(SemanticType::Color, &mut rng);
        let color = color.as_str().unwrap();
        assert!(color.starts_with('#') && color.len() == 7);

        let lat = provider.semantic_value(SemanticType::Latitude, &mut rng);
        assert!((-90.0..=90.0).contains(&lat.as_f64().unwrap()));

        let created = provider.semantic_value(SemanticType::CreatedAt, &mut rng);
        assert!(chrono::DateTime::parse_from_rfc3339(created.as_str().unwrap()).is_ok());

        let sku = provider.semantic_value(SemanticType::Sku, &mut rng);
        assert!(Regex::new(r"^SKU-[A-Z]{3}-\d{4}$")
            .unwrap()
            .is_match(sku.as_str().unwrap()));
    }

    #[test]
    fn same_seed_same_values() {
        let provider = FakerProvider;
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);
        for semantic in [SemanticType::FullName, SemanticType::City, SemanticType::Price] {
            assert_eq!(
                provider.semantic_value(semantic, &mut a),
                provider.semantic_value(semantic, &mut b)
            );
        }
    }
}
