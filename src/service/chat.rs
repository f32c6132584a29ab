//! Keyword-matched help answers for the chat widget.

use rand::seq::SliceRandom;

const RECYCLING: &[&str] = &[
    "Recycling helps reduce landfill waste and conserve natural resources.",
    "Common recyclable items include paper, cardboard, glass, metal, and most plastics.",
    "Always clean and dry recyclables before placing them in the recycling bin.",
    "Check your local recycling guidelines for specific accepted materials.",
];

const COMPOSTING: &[&str] = &[
    "Composting is a natural process that turns organic waste into nutrient-rich soil.",
    "You can compost fruit and vegetable scraps, coffee grounds, eggshells, and yard waste.",
    "Avoid composting meat, dairy, and oily foods as they can attract pests.",
    "A balanced compost pile needs a mix of greens (nitrogen) and browns (carbon).",
];

const HAZARDOUS: &[&str] = &[
    "Hazardous waste includes batteries, electronics, chemicals, and certain household products.",
    "Never dispose of hazardous waste in regular trash or down the drain.",
    "Many communities have special collection days or drop-off centers for hazardous waste.",
    "Always check the label for proper disposal instructions on hazardous materials.",
];

const GENERAL: &[&str] = &[
    "Proper waste management helps protect our environment and public health.",
    "The waste hierarchy prioritizes: reduce, reuse, recycle, and then dispose.",
    "Consider the environmental impact of your purchases to reduce waste generation.",
    "Many items can be repaired or repurposed instead of being thrown away.",
];

const IMAGE_SUFFIX: &str = " I can see the image you've shared. For proper waste management, \
please ensure items are clean, dry, and properly sorted before disposal.";

/// Topic picked from the message keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    /// Mentions recycling.
    Recycling,
    /// Mentions composting.
    Composting,
    /// Mentions hazards or chemicals.
    Hazardous,
    /// Anything else.
    General,
}

impl Topic {
    /// Matches keywords in priority order.
    #[must_use]
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("recycl") {
            Self::Recycling
        } else if lower.contains("compost") {
            Self::Composting
        } else if lower.contains("hazard") || lower.contains("chemical") {
            Self::Hazardous
        } else {
            Self::General
        }
    }

    /// Canned answers for the topic.
    #[must_use]
    pub const fn answers(self) -> &'static [&'static str] {
        match self {
            Self::Recycling => RECYCLING,
            Self::Composting => COMPOSTING,
            Self::Hazardous => HAZARDOUS,
            Self::General => GENERAL,
        }
    }
}

/// Picks an answer for `message`, adding an image note when `image_url`
/// is present and non-empty.
#[must_use]
pub fn reply(message: &str, image_url: Option<&str>) -> String {
    let topic = Topic::classify(message);
    let mut content = topic
        .answers()
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or_default()
        .to_string();
    if image_url.is_some_and(|url| !url.trim().is_empty()) {
        content.push_str(IMAGE_SUFFIX);
    }
    tracing::debug!(?topic, "chat reply");
    content
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_pick_topic() {
        assert_eq!(Topic::classify("How do I RECYCLE cans?"), Topic::Recycling);
        assert_eq!(Topic::classify("composting tips"), Topic::Composting);
        assert_eq!(Topic::classify("chemical spill"), Topic::Hazardous);
        assert_eq!(Topic::classify("hazardous stuff"), Topic::Hazardous);
        assert_eq!(Topic::classify("hello"), Topic::General);
        assert_eq!(Topic::classify("recycle compost"), Topic::Recycling);
    }

    #[test]
    fn reply_comes_from_topic() {
        let answer = reply("where to compost?", None);
        assert!(COMPOSTING.contains(&answer.as_str()));
    }

    #[test]
    fn image_adds_suffix() {
        let answer = reply("hi", Some("https://img.example/a.png"));
        assert!(answer.ends_with(IMAGE_SUFFIX));
        assert!(!reply("hi", Some("  ")).ends_with(IMAGE_SUFFIX));
    }
}
