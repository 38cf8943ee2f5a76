//! Static catalogs: narration voices and stock video clips.
//!
//! Both are read-only and compiled in; the editor loads them once.

use crate::storyboard::model::{Gender, StockVideo, VoicePersona};

/// Voice personas offered by the editor.
pub const VOICE_PERSONAS: &[VoicePersona] = &[
    VoicePersona {
        id: "male-deep",
        name: "Male - Deep",
        description: "A deep, authoritative male voice.",
        gender: Gender::Male,
        api_voice_name: Some("Algenib"),
    },
    VoicePersona {
        id: "female-energetic",
        name: "Female - Energetic",
        description: "An upbeat and energetic female voice.",
        gender: Gender::Female,
        api_voice_name: Some("Zephyr"),
    },
    VoicePersona {
        id: "male-narrator",
        name: "Male - Narrator",
        description: "A calm and steady male narrator voice.",
        gender: Gender::Male,
        api_voice_name: Some("Charon"),
    },
    VoicePersona {
        id: "female-soft",
        name: "Female - Soft",
        description: "A soft and gentle female voice.",
        gender: Gender::Female,
        api_voice_name: Some("Achernar"),
    },
    VoicePersona {
        id: "neutral-robot",
        name: "Neutral - Robotic",
        description: "A neutral, robotic voice.",
        gender: Gender::Neutral,
        api_voice_name: None,
    },
];

/// Stock clips selectable as scene visuals.
pub const STOCK_VIDEOS: &[StockVideo] = &[
    StockVideo {
        id: "city-night",
        url: "https://storage.googleapis.com/gtv-videos-bucket/sample/ForBiggerFun.mp4",
        thumbnail_url: "https://picsum.photos/seed/city-night/640/360",
        description: "A city skyline glittering at night",
        image_hint: Some("city night"),
    },
    StockVideo {
        id: "mountain-road",
        url: "https://storage.googleapis.com/gtv-videos-bucket/sample/ForBiggerJoyrides.mp4",
        thumbnail_url: "https://picsum.photos/seed/mountain-road/640/360",
        description: "A winding road through green mountains",
        image_hint: Some("mountain road"),
    },
    StockVideo {
        id: "ocean-waves",
        url: "https://storage.googleapis.com/gtv-videos-bucket/sample/ForBiggerMeltdowns.mp4",
        thumbnail_url: "https://picsum.photos/seed/ocean-waves/640/360",
        description: "Waves rolling onto a sandy beach at sunset",
        image_hint: Some("ocean sunset"),
    },
    StockVideo {
        id: "offroad-drive",
        url: "https://storage.googleapis.com/gtv-videos-bucket/sample/SubaruOutbackOnStreetAndDirt.mp4",
        thumbnail_url: "https://picsum.photos/seed/offroad-drive/640/360",
        description: "A car driving along a dirt track",
        image_hint: Some("car dirt"),
    },
    StockVideo {
        id: "sci-fi-lab",
        url: "https://storage.googleapis.com/gtv-videos-bucket/sample/TearsOfSteel.mp4",
        thumbnail_url: "https://picsum.photos/seed/sci-fi-lab/640/360",
        description: "A futuristic laboratory with glowing screens",
        image_hint: Some("science fiction"),
    },
    StockVideo {
        id: "forest-hike",
        url: "https://storage.googleapis.com/gtv-videos-bucket/sample/WeAreGoingOnAnAdventure.mp4",
        thumbnail_url: "https://picsum.photos/seed/forest-hike/640/360",
        description: "Friends hiking through a sunlit forest",
        image_hint: None,
    },
];

/// Looks up a voice persona by id.
pub fn voice_persona(id: &str) -> Option<&'static VoicePersona> {
    VOICE_PERSONAS.iter().find(|v| v.id == id)
}

/// Looks up a stock clip by id.
pub fn stock_video(id: &str) -> Option<&'static StockVideo> {
    STOCK_VIDEOS.iter().find(|v| v.id == id)
}

/// Looks up a stock clip by its playable URL.
pub fn stock_video_by_url(url: &str) -> Option<&'static StockVideo> {
    STOCK_VIDEOS.iter().find(|v| v.url == url)
}

/// Suggests up to three voice persona ids for a script.
///
/// Keyword scoring against the persona descriptions; ties keep catalog order.
/// Only personas that can actually be synthesized are suggested.
pub fn suggest_voices(script_text: &str) -> Vec<&'static str> {
    let text = script_text.to_lowercase();
    let excited = text.contains('!')
        || ["amazing", "welcome", "exciting", "new", "power", "stunning"]
            .iter()
            .any(|w| text.contains(w));
    let gentle = ["calm", "gentle", "quiet", "dream", "soft", "peace"]
        .iter()
        .any(|w| text.contains(w));
    let story = ["once", "world", "story", "journey", "history"]
        .iter()
        .any(|w| text.contains(w));

    let mut scored: Vec<(usize, u32, &'static str)> = VOICE_PERSONAS
        .iter()
        .enumerate()
        .filter(|(_, v)| v.api_voice_name.is_some())
        .map(|(i, v)| {
            let score = match v.id {
                "female-energetic" if excited => 3,
                "female-soft" if gentle => 3,
                "male-narrator" if story => 3,
                "male-deep" if story => 2,
                _ => 1,
            };
            (i, score, v.id)
        })
        .collect();

    scored.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    scored.into_iter().take(3).map(|(_, _, id)| id).collect()
}
