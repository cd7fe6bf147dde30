use crate::models::action::{
    CHALLENGE_COMPLETE, CLEAN_FRIDGE, LED_LIGHTING, NO_OLD_APPLIANCES, THERMOSTAT_ADJUST,
    UNPLUG_DEVICES,
};

/// Title keyword → logged action type. First match wins, so more specific
/// keywords come first.
const TITLE_KEYWORDS: &[(&str, &str)] = &[
    ("fridge", CLEAN_FRIDGE),
    ("freezer", CLEAN_FRIDGE),
    ("appliance", NO_OLD_APPLIANCES),
    ("thermostat", THERMOSTAT_ADJUST),
    ("heating", THERMOSTAT_ADJUST),
    ("unplug", UNPLUG_DEVICES),
    ("standby", UNPLUG_DEVICES),
    ("led", LED_LIGHTING),
    ("bulb", LED_LIGHTING),
    ("lighting", LED_LIGHTING),
];

/// Derives the coarse action type logged for a challenge from its title.
pub fn derive_action_type(title: &str) -> &'static str {
    let title = title.to_lowercase();
    TITLE_KEYWORDS
        .iter()
        .find(|(keyword, _)| title.contains(keyword))
        .map(|(_, action_type)| *action_type)
        .unwrap_or(CHALLENGE_COMPLETE)
}
