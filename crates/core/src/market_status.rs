//! Advisory market-hours status.
//!
//! FX and metals trade around the clock on weekdays; the board is treated as
//! closed from Saturday 00:00 UTC until Monday 00:00 UTC. Signal production
//! does not consult this.

use chrono::{DateTime, Datelike, Utc, Weekday};
use serde::Serialize;

use crate::language::Language;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketStatus {
    pub is_open: bool,
    pub message: String,
}

pub fn market_status(now: DateTime<Utc>, lang: Language) -> MarketStatus {
    let weekday = now.weekday();
    let is_open = !matches!(weekday, Weekday::Sat | Weekday::Sun);

    let message = match (is_open, lang) {
        (true, Language::En) => format!("Market is open ({})", weekday_name(weekday, lang)),
        (true, Language::Ru) => format!("Рынок открыт ({})", weekday_name(weekday, lang)),
        (false, Language::En) => {
            "Market is closed for the weekend, opens Monday 00:00 UTC".to_string()
        }
        (false, Language::Ru) => {
            "Рынок закрыт на выходные, откроется в понедельник в 00:00 UTC".to_string()
        }
    };

    MarketStatus { is_open, message }
}

fn weekday_name(weekday: Weekday, lang: Language) -> &'static str {
    match (lang, weekday) {
        (Language::En, Weekday::Mon) => "Monday",
        (Language::En, Weekday::Tue) => "Tuesday",
        (Language::En, Weekday::Wed) => "Wednesday",
        (Language::En, Weekday::Thu) => "Thursday",
        (Language::En, Weekday::Fri) => "Friday",
        (Language::En, Weekday::Sat) => "Saturday",
        (Language::En, Weekday::Sun) => "Sunday",
        (Language::Ru, Weekday::Mon) => "понедельник",
        (Language::Ru, Weekday::Tue) => "вторник",
        (Language::Ru, Weekday::Wed) => "среда",
        (Language::Ru, Weekday::Thu) => "четверг",
        (Language::Ru, Weekday::Fri) => "пятница",
        (Language::Ru, Weekday::Sat) => "суббота",
        (Language::Ru, Weekday::Sun) => "воскресенье",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_weekday_is_open() {
        // 2024-05-08 is a Wednesday.
        let now = Utc.with_ymd_and_hms(2024, 5, 8, 13, 30, 0).unwrap();
        let status = market_status(now, Language::En);
        assert!(status.is_open);
        assert_eq!(status.message, "Market is open (Wednesday)");

        let status = market_status(now, Language::Ru);
        assert_eq!(status.message, "Рынок открыт (среда)");
    }

    #[test]
    fn test_weekend_is_closed() {
        let saturday = Utc.with_ymd_and_hms(2024, 5, 11, 0, 0, 0).unwrap();
        let sunday = Utc.with_ymd_and_hms(2024, 5, 12, 23, 59, 59).unwrap();

        for now in [saturday, sunday] {
            let status = market_status(now, Language::En);
            assert!(!status.is_open);
            assert!(status.message.contains("Monday 00:00 UTC"));
        }

        let monday = Utc.with_ymd_and_hms(2024, 5, 13, 0, 0, 0).unwrap();
        assert!(market_status(monday, Language::Ru).is_open);
    }

    #[test]
    fn test_serializes_camel_case() {
        let now = Utc.with_ymd_and_hms(2024, 5, 11, 9, 0, 0).unwrap();
        let json = serde_json::to_value(market_status(now, Language::En)).unwrap();
        assert_eq!(json["isOpen"], false);
    }
}
