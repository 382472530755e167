// Problem gambling helplines by country

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Helpline {
    pub name: &'static str,
    pub phone: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sms: Option<&'static str>,
    pub web: &'static str,
    pub priority: u8,
}

pub const DEFAULT_COUNTRY: &str = "US";

const US: &[Helpline] = &[Helpline {
    name: "National Problem Gambling Helpline",
    phone: "1-800-522-4700",
    sms: Some("1-800-522-4700"),
    web: "https://www.ncpgambling.org/",
    priority: 1,
}];

const UK: &[Helpline] = &[Helpline {
    name: "GamCare",
    phone: "0808 8020 133",
    sms: None,
    web: "https://www.gamcare.org.uk/",
    priority: 1,
}];

const CA: &[Helpline] = &[Helpline {
    name: "Problem Gambling Institute of Ontario",
    phone: "1-888-230-3505",
    sms: None,
    web: "https://www.problemgambling.ca/",
    priority: 1,
}];

const AU: &[Helpline] = &[Helpline {
    name: "Gambling Help Online",
    phone: "1800 858 858",
    sms: None,
    web: "https://www.gamblinghelponline.org.au/",
    priority: 1,
}];

/// Helplines for an ISO country code, falling back to the US list
pub fn helplines_for(country: &str) -> &'static [Helpline] {
    match country.trim().to_ascii_uppercase().as_str() {
        "UK" | "GB" => UK,
        "CA" => CA,
        "AU" => AU,
        _ => US,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_country() {
        assert_eq!(helplines_for("uk")[0].name, "GamCare");
        assert_eq!(helplines_for("GB")[0].name, "GamCare");
        assert_eq!(helplines_for("AU")[0].phone, "1800 858 858");
    }

    #[test]
    fn test_unknown_country_falls_back_to_us() {
        assert_eq!(helplines_for("FR"), helplines_for(DEFAULT_COUNTRY));
        assert_eq!(helplines_for("")[0].sms, Some("1-800-522-4700"));
    }
}
