//! Random display names of the form `AdjectiveFirstNameLastName`.
//!
//! Names are informal: with 26 entries per list there are 17,576 possible
//! names and collisions between participants are acceptable.

use rand::seq::SliceRandom;
use rand::Rng;

pub const ADJECTIVES: [&str; 26] = [
    "Abrasive", "Brash", "Callous", "Daft", "Eccentric", "Fiesty", "Golden", "Holy",
    "Ignominious", "Joltin", "Killer", "Luscious", "Mushy", "Nasty", "OldSchool", "Pompous",
    "Quiet", "Rowdy", "Sneaky", "Tawdry", "Unique", "Vivacious", "Wicked", "Xenophobic",
    "Yawning", "Zesty",
];

pub const FIRST_NAMES: [&str; 26] = [
    "Anna", "Bobby", "Cameron", "Danny", "Emmett", "Frida", "Gracie", "Hannah", "Isaac",
    "Jenova", "Kendra", "Lando", "Mufasa", "Nate", "Owen", "Penny", "Quincy", "Roddy",
    "Samantha", "Tammy", "Ulysses", "Victoria", "Wendy", "Xander", "Yolanda", "Zelda",
];

pub const LAST_NAMES: [&str; 26] = [
    "Anchorage", "Berlin", "Cucamonga", "Davenport", "Essex", "Fresno", "Gunsight", "Hanover",
    "Indianapolis", "Jamestown", "Kane", "Liberty", "Minneapolis", "Nevis", "Oakland",
    "Portland", "Quantico", "Raleigh", "SaintPaul", "Tulsa", "Utica", "Vail", "Warsaw",
    "XiaoJin", "Yale", "Zimmerman",
];

/// Generate a name using the thread-local RNG.
pub fn generate() -> String {
    generate_with(&mut rand::thread_rng())
}

/// Generate a name drawing one adjective, first name and last name from `rng`.
pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    let adjective = pick(&ADJECTIVES, rng);
    let first = pick(&FIRST_NAMES, rng);
    let last = pick(&LAST_NAMES, rng);
    format!("{adjective}{first}{last}")
}

// The lists are non-empty constants, so `choose` always yields a value.
fn pick<R: Rng + ?Sized>(list: &[&'static str], rng: &mut R) -> &'static str {
    list.choose(rng).copied().unwrap_or_default()
}

/// Whether `name` is one of the names [`generate`] can produce.
pub fn is_generated_name(name: &str) -> bool {
    ADJECTIVES.iter().any(|adjective| {
        name.strip_prefix(adjective).is_some_and(|rest| {
            FIRST_NAMES.iter().any(|first| {
                rest.strip_prefix(first)
                    .is_some_and(|last| LAST_NAMES.contains(&last))
            })
        })
    })
}
