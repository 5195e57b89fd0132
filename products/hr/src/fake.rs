//! Synthetic contact records for demos and smoke tests.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

pub const FAKE_CONTACT_COUNT: usize = 10;

const FIRST_NAMES: &[&str] = &[
    "Ana", "Bruno", "Carla", "Diego", "Elisa", "Fabio", "Gabriela", "Heitor", "Isabela", "Joao",
    "Larissa", "Marcos", "Natalia", "Otavio", "Paula", "Rafael", "Sofia", "Tiago",
];

const LAST_NAMES: &[&str] = &[
    "Almeida", "Barbosa", "Cardoso", "Dias", "Ferreira", "Gomes", "Lima", "Martins", "Nunes",
    "Oliveira", "Pereira", "Ribeiro", "Santos", "Souza",
];

const STREETS: &[&str] = &[
    "Rua das Flores",
    "Avenida Paulista",
    "Rua Augusta",
    "Travessa do Comercio",
    "Alameda Santos",
    "Rua XV de Novembro",
];

const CITIES: &[(&str, &str)] = &[
    ("Sao Paulo", "SP"),
    ("Rio de Janeiro", "RJ"),
    ("Belo Horizonte", "MG"),
    ("Curitiba", "PR"),
    ("Porto Alegre", "RS"),
    ("Recife", "PE"),
];

const MAIL_DOMAINS: &[&str] = &["example.com", "example.org", "example.net"];

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Contact {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

impl Contact {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let first = pick(rng, FIRST_NAMES);
        let last = pick(rng, LAST_NAMES);
        let email = format!(
            "{}.{}{}@{}",
            first.to_lowercase(),
            last.to_lowercase(),
            rng.gen_range(1..1000),
            pick(rng, MAIL_DOMAINS)
        );
        let phone = format!(
            "({:02}) 9{:04}-{:04}",
            rng.gen_range(11..100),
            rng.gen_range(0..10_000),
            rng.gen_range(0..10_000)
        );
        let (city, state) = CITIES.choose(rng).copied().unwrap_or(("Sao Paulo", "SP"));
        let address = format!(
            "{}, {} - {}, {} - {:05}-{:03}",
            pick(rng, STREETS),
            rng.gen_range(1..3000),
            city,
            state,
            rng.gen_range(0..100_000),
            rng.gen_range(0..1000)
        );
        Self {
            name: format!("{first} {last}"),
            email,
            phone,
            address,
        }
    }
}

fn pick<R: Rng + ?Sized>(rng: &mut R, values: &[&'static str]) -> &'static str {
    values.choose(rng).copied().unwrap_or_default()
}

pub fn fake_contacts<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<Contact> {
    (0..count).map(|_| Contact::random(rng)).collect()
}

/// Ten random contacts as pretty-printed JSON.
pub fn fake_contacts_json() -> serde_json::Result<String> {
    let contacts = fake_contacts(&mut rand::thread_rng(), FAKE_CONTACT_COUNT);
    serde_json::to_string_pretty(&contacts)
}
