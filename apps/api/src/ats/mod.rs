pub mod profiles;

pub use profiles::{find_profile, AtsSystemProfile, ATS_PROFILES};
