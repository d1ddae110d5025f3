//! Suggestion Rules

use data_validator::{RawRecord, Scalar, VehicleClass};
use tracing::debug;

/// Returned when no EV rule fires
pub const EV_FALLBACK: &str = "No specific suggestions at this moment, keep driving safely!";

/// Returned when no HV rule fires
pub const HV_FALLBACK: &str = "No specific suggestions at this moment, enjoy your drive!";

/// One threshold rule
#[derive(Clone, Copy)]
pub struct SuggestionRule {
    /// Short identifier for logs
    pub name: &'static str,
    /// Message emitted when the rule fires
    pub message: &'static str,
    condition: fn(&RawRecord) -> bool,
}

impl SuggestionRule {
    const fn new(name: &'static str, message: &'static str, condition: fn(&RawRecord) -> bool) -> Self {
        Self {
            name,
            message,
            condition,
        }
    }

    /// Whether the rule fires for `record`
    pub fn applies(&self, record: &RawRecord) -> bool {
        (self.condition)(record)
    }
}

impl std::fmt::Debug for SuggestionRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuggestionRule").field("name", &self.name).finish()
    }
}

fn below(record: &RawRecord, field: &str, limit: f64) -> bool {
    record.number(field).map_or(false, |value| value < limit)
}

fn above(record: &RawRecord, field: &str, limit: f64) -> bool {
    record.number(field).map_or(false, |value| value > limit)
}

fn text_is(record: &RawRecord, field: &str, expected: &str) -> bool {
    record
        .text(field)
        .map_or(false, |text| text.eq_ignore_ascii_case(expected))
}

/// HVAC on: `true`, a `yes`/`true`/`1` string, or a non-zero number
pub fn hvac_active(record: &RawRecord) -> bool {
    match record.get("hvac_on") {
        Some(Scalar::Flag(flag)) => *flag,
        Some(Scalar::Number(value)) => *value != 0.0,
        Some(Scalar::Text(text)) => {
            let text = text.to_lowercase();
            matches!(text.as_str(), "yes" | "true" | "1")
        }
        None => false,
    }
}

const EV_RULES: &[SuggestionRule] = &[
    SuggestionRule::new(
        "low_battery",
        "Your battery is low. Consider finding a charging station soon.",
        |r| below(r, "battery_percentage", 20.0),
    ),
    SuggestionRule::new(
        "battery_age",
        "Your battery is aging. Regular check-ups can help maintain performance.",
        |r| above(r, "battery_age_years", 5.0),
    ),
    SuggestionRule::new(
        "cold_preconditioning",
        "In cold weather, pre-conditioning your EV while plugged in can save significant range.",
        |r| text_is(r, "ambient_temp", "cold") && hvac_active(r),
    ),
    SuggestionRule::new(
        "highway_speed",
        "High speeds reduce range. Consider engaging 'Eco' mode for better efficiency on highways.",
        |r| above(r, "speed_avg_kmph", 100.0) && text_is(r, "driving_mode", "normal"),
    ),
    SuggestionRule::new(
        "hvac_usage",
        "Turning off HVAC when not essential can significantly extend your EV's range.",
        hvac_active,
    ),
];

const HV_RULES: &[SuggestionRule] = &[
    SuggestionRule::new(
        "low_hydrogen",
        "Your hydrogen tank is low. Plan for a refuel soon.",
        |r| below(r, "hydrogen_percentage", 15.0),
    ),
    SuggestionRule::new(
        "fuel_cell_age",
        "Your fuel cell is aging. Regular inspections are recommended for optimal performance.",
        |r| above(r, "fuel_cell_age_years", 7.0),
    ),
    SuggestionRule::new(
        "fuel_cell_efficiency",
        "Consider a fuel cell system check-up to improve efficiency.",
        |r| below(r, "fuel_cell_efficiency", 60.0),
    ),
    SuggestionRule::new(
        "steep_acceleration",
        "Aggressive acceleration on steep slopes consumes more hydrogen. Try a gentler approach.",
        |r| above(r, "terrain_slope", 10.0) && above(r, "acceleration_level", 0.5),
    ),
    SuggestionRule::new(
        "sport_mode",
        "Sport mode prioritizes power over efficiency. For better range, switch to 'Normal' or 'Eco' mode.",
        |r| text_is(r, "driving_mode", "sport"),
    ),
];

/// Ordered rule set for one vehicle class
#[derive(Debug, Clone, Copy)]
pub struct SuggestionEngine {
    vehicle: VehicleClass,
    rules: &'static [SuggestionRule],
    fallback: &'static str,
}

impl SuggestionEngine {
    /// EV rules
    pub fn ev() -> Self {
        Self {
            vehicle: VehicleClass::Ev,
            rules: EV_RULES,
            fallback: EV_FALLBACK,
        }
    }

    /// HV rules
    pub fn hv() -> Self {
        Self {
            vehicle: VehicleClass::Hv,
            rules: HV_RULES,
            fallback: HV_FALLBACK,
        }
    }

    /// Engine for a vehicle class
    pub fn for_class(vehicle: VehicleClass) -> Self {
        match vehicle {
            VehicleClass::Ev => Self::ev(),
            VehicleClass::Hv => Self::hv(),
        }
    }

    /// Rules in evaluation order
    pub fn rules(&self) -> &'static [SuggestionRule] {
        self.rules
    }

    /// Messages of every rule that fires, in rule order; never empty
    pub fn suggest(&self, record: &RawRecord) -> Vec<String> {
        let fired: Vec<&SuggestionRule> = self.rules.iter().filter(|rule| rule.applies(record)).collect();
        debug!(
            "[{}] Suggestion rules fired: {:?}",
            self.vehicle,
            fired.iter().map(|rule| rule.name).collect::<Vec<_>>()
        );

        if fired.is_empty() {
            return vec![self.fallback.to_string()];
        }
        fired.into_iter().map(|rule| rule.message.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn quiet_ev() -> RawRecord {
        RawRecord::new()
            .with("battery_percentage", 80.0)
            .with("battery_age_years", 2.0)
            .with("ambient_temp", "mild")
            .with("speed_avg_kmph", 60.0)
            .with("hvac_on", false)
            .with("driving_mode", "Normal")
    }

    fn quiet_hv() -> RawRecord {
        RawRecord::new()
            .with("hydrogen_percentage", 70.0)
            .with("fuel_cell_age_years", 1.0)
            .with("fuel_cell_efficiency", 75.0)
            .with("terrain_slope", 2.0)
            .with("acceleration_level", 0.3)
            .with("hvac_on", "no")
            .with("driving_mode", "eco")
    }

    #[test]
    fn test_low_battery() {
        let mut record = quiet_ev();
        record.insert("battery_percentage", 15.0);

        let suggestions = SuggestionEngine::ev().suggest(&record);
        assert_eq!(
            suggestions,
            vec!["Your battery is low. Consider finding a charging station soon.".to_string()]
        );
    }

    #[test]
    fn test_ev_fallback() {
        assert_eq!(SuggestionEngine::ev().suggest(&quiet_ev()), vec![EV_FALLBACK.to_string()]);
    }

    #[test]
    fn test_hv_fallback() {
        assert_eq!(SuggestionEngine::hv().suggest(&quiet_hv()), vec![HV_FALLBACK.to_string()]);
    }

    #[test]
    fn test_ev_rules_fire_in_order() {
        let record = quiet_ev()
            .with("ambient_temp", "Cold")
            .with("hvac_on", true)
            .with("speed_avg_kmph", 130.0)
            .with("driving_mode", "NORMAL");

        let suggestions = SuggestionEngine::ev().suggest(&record);
        assert_eq!(suggestions.len(), 3);
        assert!(suggestions[0].starts_with("In cold weather"));
        assert!(suggestions[1].starts_with("High speeds"));
        assert!(suggestions[2].starts_with("Turning off HVAC"));
    }

    #[test]
    fn test_hv_steep_slope_and_sport() {
        let record = quiet_hv()
            .with("terrain_slope", 12.0)
            .with("acceleration_level", 0.8)
            .with("driving_mode", "Sport")
            .with("fuel_cell_efficiency", 55.0);

        let suggestions = SuggestionEngine::hv().suggest(&record);
        assert_eq!(
            suggestions,
            vec![
                "Consider a fuel cell system check-up to improve efficiency.".to_string(),
                "Aggressive acceleration on steep slopes consumes more hydrogen. Try a gentler approach."
                    .to_string(),
                "Sport mode prioritizes power over efficiency. For better range, switch to 'Normal' or 'Eco' mode."
                    .to_string(),
            ]
        );
    }

    #[test]
    fn test_hvac_active_forms() {
        assert!(hvac_active(&RawRecord::new().with("hvac_on", "YES")));
        assert!(hvac_active(&RawRecord::new().with("hvac_on", "true")));
        assert!(hvac_active(&RawRecord::new().with("hvac_on", "1")));
        assert!(hvac_active(&RawRecord::new().with("hvac_on", 2.0)));
        assert!(!hvac_active(&RawRecord::new().with("hvac_on", "no")));
        assert!(!hvac_active(&RawRecord::new().with("hvac_on", 0.0)));
        assert!(!hvac_active(&RawRecord::new()));
    }

    proptest! {
        #[test]
        fn test_suggestions_never_empty(battery in 0.0f64..100.0, speed in 0.0f64..200.0, hvac in any::<bool>()) {
            let record = quiet_ev()
                .with("battery_percentage", battery)
                .with("speed_avg_kmph", speed)
                .with("hvac_on", hvac);
            let suggestions = SuggestionEngine::ev().suggest(&record);
            prop_assert!(!suggestions.is_empty());
            prop_assert_eq!(suggestions.contains(&EV_FALLBACK.to_string()), suggestions.len() == 1 && battery >= 20.0 && !hvac && speed <= 100.0);
        }
    }
}
