//! Text and audio helpers for the speech client.

/// Longest text sent to synthesis, in characters
pub const MAX_TTS_CHARS: usize = 1000;

const VIETNAMESE_REPLACEMENTS: &[(&str, &str)] = &[
    ("kg", "ki-lô-gam"),
    ("cm", "xen-ti-mét"),
    ("mm", "mi-li-mét"),
    ("km", "ki-lô-mét"),
    ("°C", "độ C"),
    ("%", " phần trăm"),
    ("&", " và "),
    ("@", " a còng "),
    ("vs", "so với"),
    ("API", "A-P-I"),
    ("AI", "A-I"),
    ("URL", "U-R-L"),
    ("HTTP", "H-T-T-P"),
    ("=", " bằng "),
];

const ENGLISH_REPLACEMENTS: &[(&str, &str)] = &[
    ("kg", "kilograms"),
    ("cm", "centimeters"),
    ("mm", "millimeters"),
    ("km", "kilometers"),
    ("°C", "degrees Celsius"),
    ("%", " percent"),
    ("&", " and "),
    ("@", " at "),
    ("vs", "versus"),
    ("=", " equals "),
];

/// Clean text for synthesis; `None` when nothing speakable is left
pub fn preprocess_text(text: &str, language: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut text: String = if trimmed.chars().count() > MAX_TTS_CHARS {
        let mut cut: String = trimmed.chars().take(MAX_TTS_CHARS).collect();
        cut.push_str("...");
        cut
    } else {
        trimmed.to_string()
    };

    let table = if language.to_ascii_lowercase().starts_with("vi") {
        VIETNAMESE_REPLACEMENTS
    } else {
        ENGLISH_REPLACEMENTS
    };
    for (from, to) in table {
        text = replace_token(&text, from, to);
    }

    for markup in ["```", "**", "*", "_", "`", "#", "<", ">"] {
        text = text.replace(markup, "");
    }

    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!collapsed.is_empty()).then_some(collapsed)
}

/// Replace `from` unless it sits inside a longer alphabetic word
fn replace_token(text: &str, from: &str, to: &str) -> String {
    let alphabetic = from.chars().all(char::is_alphabetic);
    if !alphabetic {
        return text.replace(from, to);
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find(from) {
        let before = rest[..pos].chars().next_back();
        let after = rest[pos + from.len()..].chars().next();
        let standalone = !before.is_some_and(char::is_alphabetic) && !after.is_some_and(char::is_alphabetic);

        out.push_str(&rest[..pos]);
        out.push_str(if standalone { to } else { from });
        rest = &rest[pos + from.len()..];
    }
    out.push_str(rest);
    out
}

/// SSML document for one utterance
pub fn build_ssml(text: &str, voice: &str, language: &str) -> String {
    format!(
        "<speak version=\"1.0\" xmlns=\"http://www.w3.org/2001/10/synthesis\" xml:lang=\"{language}\">\
         <voice name=\"{voice}\"><prosody rate=\"0.9\" pitch=\"+0%\">{text}</prosody></voice></speak>"
    )
}

/// Container formats accepted for recognition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Wav,
    Ogg,
    WebM,
    Unknown,
}

impl AudioFormat {
    /// Content type for the recognition request
    pub fn content_type(&self) -> &'static str {
        match self {
            AudioFormat::Wav | AudioFormat::Unknown => "audio/wav; codecs=audio/pcm; samplerate=16000",
            AudioFormat::Ogg => "audio/ogg; codecs=opus",
            AudioFormat::WebM => "audio/webm; codecs=opus",
        }
    }
}

/// Sniff the container from the first bytes
pub fn detect_audio_format(audio: &[u8]) -> AudioFormat {
    if audio.starts_with(b"RIFF") {
        return AudioFormat::Wav;
    }
    if audio.starts_with(b"OggS") {
        return AudioFormat::Ogg;
    }

    let head = &audio[..audio.len().min(100)];
    let is_webm = audio.starts_with(&[0x1A, 0x45, 0xDF, 0xA3])
        || head.windows(4).any(|w| w.eq_ignore_ascii_case(b"webm"));
    if is_webm {
        AudioFormat::WebM
    } else {
        AudioFormat::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_is_not_spoken() {
        assert_eq!(preprocess_text("   \n ", "vi-VN"), None);
        assert_eq!(preprocess_text("** __ **", "vi-VN"), None);
    }

    #[test]
    fn markdown_and_whitespace_are_cleaned() {
        let text = preprocess_text("**Oats**  are\n\n`good` <b>", "en-US").unwrap();
        assert_eq!(text, "Oats are good b");
    }

    #[test]
    fn units_are_spelled_out_only_as_standalone_tokens() {
        assert_eq!(preprocess_text("Lose 2 kg", "vi-VN").unwrap(), "Lose 2 ki-lô-gam");
        assert_eq!(preprocess_text("Lose 2kg", "en-US").unwrap(), "Lose 2kilograms");
        assert_eq!(preprocess_text("backgammon", "en-US").unwrap(), "backgammon");
        assert_eq!(preprocess_text("rice & beans", "en-US").unwrap(), "rice and beans");
    }

    #[test]
    fn long_text_is_truncated() {
        let long = "a".repeat(MAX_TTS_CHARS + 50);
        let text = preprocess_text(&long, "en-US").unwrap();
        assert_eq!(text.chars().count(), MAX_TTS_CHARS + 3);
        assert!(text.ends_with("..."));
    }

    #[test]
    fn ssml_wraps_voice_and_rate() {
        let ssml = build_ssml("Xin chào", "vi-VN-HoaiMyNeural", "vi-VN");
        assert!(ssml.contains("xml:lang=\"vi-VN\""));
        assert!(ssml.contains("<voice name=\"vi-VN-HoaiMyNeural\">"));
        assert!(ssml.contains("rate=\"0.9\""));
        assert!(ssml.contains(">Xin chào<"));
    }

    #[test]
    fn formats_are_sniffed() {
        assert_eq!(detect_audio_format(b"RIFF\x00\x00WAVE"), AudioFormat::Wav);
        assert_eq!(detect_audio_format(b"OggS\x00\x02"), AudioFormat::Ogg);
        assert_eq!(detect_audio_format(&[0x1A, 0x45, 0xDF, 0xA3, 0x01]), AudioFormat::WebM);
        assert_eq!(detect_audio_format(b"\x00\x00 matroska WEBM"), AudioFormat::WebM);
        assert_eq!(detect_audio_format(b"ID3"), AudioFormat::Unknown);
        assert_eq!(AudioFormat::Ogg.content_type(), "audio/ogg; codecs=opus");
    }
}
