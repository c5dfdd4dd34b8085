//! Scenario fixtures: synthetic guests and the booking choices a flow makes

use bookflow_common::{CardDetails, Guest};
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::E2eResult;
use crate::pages::home::{Rate, Suite};
use crate::playwright::Device;

const FIRST_NAMES: &[&str] = &[
    "Amelia", "Oliver", "Charlotte", "Jack", "Isla", "Noah", "Mia", "William", "Ava", "Leo",
    "Grace", "Henry", "Chloe", "Lucas", "Zoe", "Thomas", "Ruby", "Ethan", "Sophie", "Liam",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Jones", "Williams", "Brown", "Wilson", "Taylor", "Nguyen", "Johnson", "Martin",
    "White", "Anderson", "Walker", "Thompson", "Harris", "Ryan", "Robinson", "Kelly", "King",
    "O'Brien", "Campbell",
];

const EMAIL_DOMAINS: &[&str] = &["example.com", "example.org", "example.net"];

/// Source of synthetic guest identities
pub trait GuestSource {
    fn first_name(&mut self) -> String;

    fn last_name(&mut self) -> String;

    fn email(&mut self, first_name: &str, last_name: &str) -> String;

    fn guest(&mut self, mobile: &str) -> E2eResult<Guest> {
        let first_name = self.first_name();
        let last_name = self.last_name();
        let email = self.email(&first_name, &last_name);
        Ok(Guest::new(first_name, last_name, email, mobile)?)
    }
}

/// Deterministic guest generator; the same seed replays the same guests
pub struct SeededGuests {
    rng: StdRng,
}

impl SeededGuests {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn pick(&mut self, options: &[&str]) -> String {
        options.choose(&mut self.rng).copied().unwrap_or("Guest").to_string()
    }
}

fn email_local_part(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase()
}

impl GuestSource for SeededGuests {
    fn first_name(&mut self) -> String {
        self.pick(FIRST_NAMES)
    }

    fn last_name(&mut self) -> String {
        self.pick(LAST_NAMES)
    }

    fn email(&mut self, first_name: &str, last_name: &str) -> String {
        let suffix: u16 = self.rng.gen_range(1..1000);
        let domain = self.pick(EMAIL_DOMAINS);
        format!(
            "{}.{}{}@{}",
            email_local_part(first_name),
            email_local_part(last_name),
            suffix,
            domain
        )
    }
}

/// Everything a single booking flow needs, passed in explicitly
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub home_path: String,
    pub guest: Guest,
    pub card: CardDetails,
    pub suite: Suite,
    pub rate: Rate,
    pub address: String,

    /// Date the calendar offsets are counted from
    pub today: NaiveDate,
    pub lead_days: u32,
    pub nights: u32,
}

/// Fixture settings shared by every flow in a run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureConfig {
    pub home_path: String,
    pub suite: Suite,
    pub rate: Rate,
    pub mobile: String,
    pub address: String,
    pub lead_days: u32,
    pub nights: u32,

    /// Card override; the gateway test Visa when unset
    pub card_number: Option<String>,
    pub card_expiry: Option<String>,
    pub card_security_code: Option<String>,

    /// Guest generator seed; random when unset
    pub seed: Option<u64>,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            home_path: "/22749/1".to_string(),
            suite: Suite::DeluxeKing,
            rate: Rate::BedAndBreakfast,
            mobile: "1234567890".to_string(),
            address: "Melbourne".to_string(),
            lead_days: 3,
            nights: 1,
            card_number: None,
            card_expiry: None,
            card_security_code: None,
            seed: None,
        }
    }
}

impl FixtureConfig {
    /// The configured seed, or a fresh one when unset
    pub fn base_seed(&self) -> u64 {
        self.seed.unwrap_or_else(|| rand::thread_rng().gen())
    }

    /// Build the scenario for `device` from the run's base seed.
    /// Desktop uses the base seed and mobile the next one, so each device
    /// gets its own guest and the base seed alone replays both.
    pub fn scenario(
        &self,
        device: Device,
        today: NaiveDate,
        base_seed: u64,
    ) -> E2eResult<ScenarioConfig> {
        let seed = match device {
            Device::Desktop => base_seed,
            Device::Mobile => base_seed.wrapping_add(1),
        };
        let guest = SeededGuests::new(seed).guest(&self.mobile)?;

        let mut card = CardDetails::test_visa(guest.first_name.clone());
        if let Some(number) = &self.card_number {
            card.number = number.clone();
        }
        if let Some(expiry) = &self.card_expiry {
            card.expiry = expiry.clone();
        }
        if let Some(code) = &self.card_security_code {
            card.security_code = code.clone();
        }

        Ok(ScenarioConfig {
            home_path: self.home_path.clone(),
            guest,
            card,
            suite: self.suite,
            rate: self.rate,
            address: self.address.clone(),
            today,
            lead_days: self.lead_days,
            nights: self.nights,
        })
    }
}
