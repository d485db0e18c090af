use whatlang::detect;

/// Characters inspected per text.
pub const MAX_DETECT_CHARS: usize = 500;
pub const UNKNOWN_LANGUAGE: &str = "unknown";

/// Best-effort ISO 639-1 code for `text`, or `"unknown"`. Never fails.
pub fn detect_language(text: &str) -> String {
    let prefix: String = text.chars().take(MAX_DETECT_CHARS).collect();
    if prefix.trim().is_empty() {
        return UNKNOWN_LANGUAGE.to_string();
    }

    detect(&prefix)
        .and_then(|info| iso_639_1(info.lang().code()))
        .unwrap_or(UNKNOWN_LANGUAGE)
        .to_string()
}

// whatlang reports ISO 639-3; the dataset column is ISO 639-1.
fn iso_639_1(code3: &str) -> Option<&'static str> {
    let code = match code3 {
        "afr" => "af",
        "aka" => "ak",
        "amh" => "am",
        "ara" => "ar",
        "aze" => "az",
        "bel" => "be",
        "ben" => "bn",
        "bul" => "bg",
        "cat" => "ca",
        "ces" => "cs",
        "cmn" => "zh",
        "dan" => "da",
        "deu" => "de",
        "ell" => "el",
        "eng" => "en",
        "epo" => "eo",
        "est" => "et",
        "fin" => "fi",
        "fra" => "fr",
        "guj" => "gu",
        "heb" => "he",
        "hin" => "hi",
        "hrv" => "hr",
        "hun" => "hu",
        "hye" => "hy",
        "ind" => "id",
        "ita" => "it",
        "jav" => "jv",
        "jpn" => "ja",
        "kan" => "kn",
        "kat" => "ka",
        "khm" => "km",
        "kor" => "ko",
        "lat" => "la",
        "lav" => "lv",
        "lit" => "lt",
        "mal" => "ml",
        "mar" => "mr",
        "mkd" => "mk",
        "mya" => "my",
        "nep" => "ne",
        "nld" => "nl",
        "nob" => "nb",
        "ori" => "or",
        "pan" => "pa",
        "pes" => "fa",
        "pol" => "pl",
        "por" => "pt",
        "ron" => "ro",
        "rus" => "ru",
        "sin" => "si",
        "slk" => "sk",
        "slv" => "sl",
        "sna" => "sn",
        "spa" => "es",
        "srp" => "sr",
        "swe" => "sv",
        "tam" => "ta",
        "tel" => "te",
        "tgl" => "tl",
        "tha" => "th",
        "tuk" => "tk",
        "tur" => "tr",
        "ukr" => "uk",
        "urd" => "ur",
        "uzb" => "uz",
        "vie" => "vi",
        "yid" => "yi",
        "zul" => "zu",
        _ => return None,
    };
    Some(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_blank_are_unknown() {
        assert_eq!(detect_language(""), "unknown");
        assert_eq!(detect_language("   \n\t"), "unknown");
    }

    #[test]
    fn common_scripts_are_detected() {
        assert_eq!(
            detect_language("The official music video for the new single is finally here, watch it now"),
            "en"
        );
        assert_eq!(detect_language("Это официальный трейлер нового фильма, который выйдет в кинотеатрах"), "ru");
        assert_eq!(detect_language("公式ミュージックビデオがついに公開されました。ぜひご覧ください"), "ja");
    }

    #[test]
    fn long_text_is_truncated_not_rejected() {
        let long = "This is a perfectly ordinary English sentence about football highlights. ".repeat(40);
        assert!(long.chars().count() > MAX_DETECT_CHARS);
        assert_eq!(detect_language(&long), "en");
    }

    #[test]
    fn codes_are_two_letters_or_sentinel() {
        for text in ["12345 !!! ???", "🔥🔥🔥", "Mañana es el gran partido de la final", "a"] {
            let code = detect_language(text);
            assert!(code == UNKNOWN_LANGUAGE || code.len() == 2, "unexpected code {code}");
        }
    }
}
