//! Pure string helpers used by every page: Markdown stripping, headline
//! casing, reading time, Brazilian-Portuguese dates, and the sanitizers
//! applied before user or CMS text reaches a query string or a JSON-LD block.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Utc};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use unicode_normalization::UnicodeNormalization;

use crate::validate::parse_timestamp;

/// Reading speed assumed by [`reading_time_minutes`].
pub const WORDS_PER_MINUTE: usize = 200;
/// Longest query [`sanitize_search_query`] lets through.
pub const MAX_SEARCH_QUERY_CHARS: usize = 200;
/// Characters kept by [`clean_meta_description`] before the ellipsis.
pub const META_DESCRIPTION_CHARS: usize = 150;

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static regex must compile")
}

static MD_HEADER: Lazy<Regex> = Lazy::new(|| compile(r"(?m)^#{1,6}\s+"));
static MD_IMAGE: Lazy<Regex> = Lazy::new(|| compile(r"!\[([^\]]*)\]\([^)]*\)"));
static MD_LINK: Lazy<Regex> = Lazy::new(|| compile(r"\[([^\]]+)\]\([^)]+\)"));
static MD_BOLD_STARS: Lazy<Regex> = Lazy::new(|| compile(r"\*\*(.*?)\*\*"));
static MD_BOLD_UNDERSCORES: Lazy<Regex> = Lazy::new(|| compile(r"__(.*?)__"));
static MD_ITALIC_STAR: Lazy<Regex> = Lazy::new(|| compile(r"\*(.*?)\*"));
static MD_ITALIC_UNDERSCORE: Lazy<Regex> = Lazy::new(|| compile(r"_(.*?)_"));
static MD_INLINE_CODE: Lazy<Regex> = Lazy::new(|| compile(r"`([^`]+)`"));
static MD_STRIKETHROUGH: Lazy<Regex> = Lazy::new(|| compile(r"~~(.*?)~~"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| compile(r"\s+"));

static TITLE_PREFIX_BOLD: Lazy<Regex> = Lazy::new(|| compile(r"(?i)^\*\*?\s*título\s*:\s*"));
static TITLE_PREFIX: Lazy<Regex> = Lazy::new(|| compile(r"(?i)^título\s*:\s*"));

static SENTENCE_START: Lazy<Regex> = Lazy::new(|| compile(r"([.!?:]\s+)(\p{Ll})"));

static JS_SCHEME: Lazy<Regex> = Lazy::new(|| compile(r"(?i)javascript:"));
static INLINE_HANDLER: Lazy<Regex> = Lazy::new(|| compile(r"(?i)on\w+="));

/// Names whose casing must survive headline normalization.
const PROPER_NOUNS: &[&str] = &[
    // Ativos e redes
    "Bitcoin",
    "Bitcoin Cash",
    "BTC",
    "Ethereum",
    "Ethereum Classic",
    "Ethereum Foundation",
    "ETH",
    "Solana",
    "Cardano",
    "XRP",
    "Ripple",
    "Tether",
    "USDT",
    "USDC",
    "BNB",
    "Dogecoin",
    "Shiba Inu",
    "Polygon",
    "AVAX",
    "Chainlink",
    "Uniswap",
    "Polkadot",
    "Litecoin",
    "Arbitrum",
    "Toncoin",
    "Drex",
    "Pix",
    // Empresas e pessoas
    "Binance",
    "Coinbase",
    "Kraken",
    "Bybit",
    "OKX",
    "FTX",
    "Circle",
    "BlackRock",
    "Fidelity",
    "Grayscale",
    "MicroStrategy",
    "Michael Saylor",
    "Vitalik Buterin",
    "Satoshi Nakamoto",
    "Elon Musk",
    "Donald Trump",
    "Trump",
    "Tesla",
    "Telegram",
    "PayPal",
    "Mastercard",
    "JPMorgan",
    "Goldman Sachs",
    "MetaMask",
    "Nasdaq",
    "Wall Street",
    // Reguladores
    "SEC",
    "CVM",
    "Comissão de Valores Mobiliários",
    "Fed",
    "Federal Reserve",
    "FMI",
    "Banco Central",
    "Banco Central Europeu",
    "Receita Federal",
    // Países e blocos
    "Brasil",
    "Estados Unidos",
    "EUA",
    "China",
    "Japão",
    "Coreia do Sul",
    "Reino Unido",
    "União Europeia",
    "El Salvador",
    "Argentina",
    "Rússia",
    "Hong Kong",
    // Siglas do setor
    "DeFi",
    "NFT",
    "NFTs",
    "ETF",
    "ETFs",
    "DAO",
    "CBDC",
    "Web3",
    "Layer 2",
];

struct ProperNounMatcher {
    pattern: Regex,
    canonical: HashMap<String, &'static str>,
}

static PROPER_NOUN_MATCHER: Lazy<ProperNounMatcher> = Lazy::new(|| {
    let mut nouns: Vec<&'static str> = PROPER_NOUNS.to_vec();
    // Alternation is leftmost-first, so longer names must come first for
    // "Ethereum Foundation" to win over "Ethereum".
    nouns.sort_by_key(|noun| std::cmp::Reverse(noun.chars().count()));

    let alternatives: Vec<String> = nouns
        .iter()
        .map(|noun| {
            let starts_word = noun.chars().next().is_some_and(char::is_alphanumeric);
            let ends_word = noun.chars().last().is_some_and(char::is_alphanumeric);
            format!(
                "{}{}{}",
                if starts_word { r"\b" } else { "" },
                regex::escape(noun),
                if ends_word { r"\b" } else { "" },
            )
        })
        .collect();

    ProperNounMatcher {
        pattern: compile(&format!("(?i)(?:{})", alternatives.join("|"))),
        canonical: nouns
            .iter()
            .map(|noun| (noun.to_lowercase(), *noun))
            .collect(),
    }
});

/// Remove Markdown markers and collapse whitespace.
///
/// Links and images are reduced to their text before emphasis is handled,
/// and `**` is consumed before `*`. The passes repeat until nothing changes,
/// so the result is always a fixed point.
pub fn strip_markdown(text: &str) -> String {
    let mut current = strip_markdown_once(text);
    loop {
        let next = strip_markdown_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn strip_markdown_once(text: &str) -> String {
    let text = MD_HEADER.replace_all(text, "");
    let text = MD_IMAGE.replace_all(&text, "${1}");
    let text = MD_LINK.replace_all(&text, "${1}");
    let text = MD_BOLD_STARS.replace_all(&text, "${1}");
    let text = MD_BOLD_UNDERSCORES.replace_all(&text, "${1}");
    let text = MD_ITALIC_STAR.replace_all(&text, "${1}");
    let text = MD_ITALIC_UNDERSCORE.replace_all(&text, "${1}");
    let text = MD_INLINE_CODE.replace_all(&text, "${1}");
    let text = MD_STRIKETHROUGH.replace_all(&text, "${1}");
    WHITESPACE.replace_all(&text, " ").trim().to_string()
}

/// Plain-text description for meta tags: drops a leading `Título:` label,
/// strips Markdown, and caps the length at 150 characters.
pub fn clean_meta_description(text: &str) -> String {
    let text = TITLE_PREFIX_BOLD.replace(text, "");
    let text = TITLE_PREFIX.replace(&text, "");
    truncate_chars(&strip_markdown(&text), META_DESCRIPTION_CHARS)
}

/// Cut `text` to at most `max_chars` characters, appending `...` when
/// anything was dropped.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max_chars).collect();
    format!("{}...", truncated.trim_end())
}

/// Drop the first line of `content` when it just repeats the title.
pub fn remove_duplicate_title(content: &str, title: &str) -> String {
    let (first_line, rest) = content.split_once('\n').unwrap_or((content, ""));

    let clean_title = strip_markdown(title).to_lowercase();
    let raw_first = first_line.trim().to_lowercase();
    let clean_first = strip_markdown(first_line).to_lowercase();

    let repeats_title = !clean_title.is_empty() && clean_first.contains(&clean_title);
    if repeats_title || clean_first.starts_with("título:") || raw_first.starts_with("**título:") {
        return rest.trim().to_string();
    }
    content.to_string()
}

/// Minutes needed to read `content` at 200 words per minute, rounded up.
/// Content without any words reads in zero minutes.
pub fn reading_time_minutes(content: &str) -> u32 {
    let words = content.split_whitespace().count();
    u32::try_from(words.div_ceil(WORDS_PER_MINUTE)).unwrap_or(u32::MAX)
}

/// Headline casing: sentence case, known proper nouns restored, and a
/// capital after sentence-ending punctuation or a colon.
pub fn format_title(title: &str) -> String {
    let lowered = title.to_lowercase();
    let capitalized = capitalize_first_letter(&lowered);

    let matcher = &*PROPER_NOUN_MATCHER;
    let restored = matcher
        .pattern
        .replace_all(&capitalized, |caps: &Captures<'_>| {
            let found = &caps[0];
            matcher
                .canonical
                .get(&found.to_lowercase())
                .map(|canonical| (*canonical).to_string())
                .unwrap_or_else(|| found.to_string())
        });

    SENTENCE_START
        .replace_all(&restored, |caps: &Captures<'_>| {
            format!("{}{}", &caps[1], caps[2].to_uppercase())
        })
        .into_owned()
}

fn capitalize_first_letter(text: &str) -> String {
    let Some((index, first)) = text.char_indices().find(|(_, ch)| ch.is_alphabetic()) else {
        return text.to_string();
    };
    let mut output = String::with_capacity(text.len());
    output.push_str(&text[..index]);
    output.extend(first.to_uppercase());
    output.push_str(&text[index + first.len_utf8()..]);
    output
}

/// Date rendering style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateStyle {
    /// `05 de março de 2026`
    #[default]
    Long,
    /// `05 de mar.`
    Short,
}

const MONTHS_LONG: [&str; 12] = [
    "janeiro", "fevereiro", "março", "abril", "maio", "junho", "julho", "agosto", "setembro",
    "outubro", "novembro", "dezembro",
];

const MONTHS_SHORT: [&str; 12] = [
    "jan.", "fev.", "mar.", "abr.", "mai.", "jun.", "jul.", "ago.", "set.", "out.", "nov.", "dez.",
];

/// Format a date in Brazilian Portuguese.
pub fn format_date(value: &DateTime<Utc>, style: DateStyle) -> String {
    let month = value.month0() as usize;
    match style {
        DateStyle::Long => {
            format!("{:02} de {} de {}", value.day(), MONTHS_LONG[month], value.year())
        },
        DateStyle::Short => format!("{:02} de {}", value.day(), MONTHS_SHORT[month]),
    }
}

/// Like [`format_date`] for raw API strings; unparseable input comes back
/// unchanged.
pub fn format_date_str(raw: &str, style: DateStyle) -> String {
    parse_timestamp(raw)
        .map(|value| format_date(&value, style))
        .unwrap_or_else(|| raw.to_string())
}

/// Make a search query safe to forward: tag brackets, quotes, semicolons,
/// backslashes, and control characters are removed, and the result is capped
/// at 200 characters.
pub fn sanitize_search_query(query: &str) -> String {
    let cleaned: String = query
        .chars()
        .filter(|ch| !matches!(ch, '<' | '>' | '\'' | '"' | ';' | '\\'))
        .filter(|ch| !matches!(ch, '\u{00}'..='\u{1F}' | '\u{7F}'))
        .take(MAX_SEARCH_QUERY_CHARS)
        .collect();
    cleaned.trim().to_string()
}

/// Escape CMS text for interpolation into a JSON-LD `<script>` block.
pub fn escape_json_ld(value: Option<&str>) -> String {
    let Some(value) = value.filter(|value| !value.is_empty()) else {
        return String::new();
    };
    let escaped = value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;");
    let escaped = JS_SCHEME.replace_all(&escaped, "");
    INLINE_HANDLER.replace_all(&escaped, "").into_owned()
}

/// Lower-case and strip diacritics so `regulação` matches `regulacao`.
pub fn fold_for_search(text: &str) -> String {
    text.nfd()
        .filter(|ch| !matches!(ch, '\u{0300}'..='\u{036F}'))
        .collect::<String>()
        .to_lowercase()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn strip_markdown_removes_emphasis() {
        assert_eq!(
            strip_markdown("**Bitcoin** atinge *novo* recorde"),
            "Bitcoin atinge novo recorde"
        );
    }

    #[test]
    fn strip_markdown_handles_headers_links_code_and_strikethrough() {
        let input = "## Análise\n\nVeja [o relatório](https://x.com/a_b_c) e `código` ~~antigo~~ \
                     ![gráfico](img.png)";
        assert_eq!(strip_markdown(input), "Análise Veja o relatório e código antigo gráfico");
    }

    #[test]
    fn strip_markdown_is_idempotent() {
        let samples = [
            "**Bitcoin** atinge *novo* recorde",
            "`` a ``",
            "# # título duplo",
            "***forte e itálico***",
            "__sublinhado__ e _itálico_ e ~~~riscado~~~",
            "[link [aninhado]](http://x)",
            "",
        ];
        for sample in samples {
            let once = strip_markdown(sample);
            assert_eq!(strip_markdown(&once), once, "not idempotent for {sample:?}");
        }
    }

    #[test]
    fn format_title_restores_proper_nouns_and_capitalizes_after_colon() {
        assert_eq!(
            format_title("bitcoin atinge novo recorde: ethereum cai"),
            "Bitcoin atinge novo recorde: Ethereum cai"
        );
    }

    #[test]
    fn format_title_prefers_longest_proper_noun() {
        assert_eq!(
            format_title("ETHEREUM FOUNDATION VENDE ETH. sec reage"),
            "Ethereum Foundation vende ETH. SEC reage"
        );
        assert_eq!(format_title("comissão de valores mobiliários e o drex"), "Comissão de Valores Mobiliários e o Drex");
    }

    #[test]
    fn format_title_leaves_partial_words_alone() {
        assert_eq!(format_title("ethereal ciência"), "Ethereal ciência");
        assert_eq!(format_title("\"xrp dispara\""), "\"XRP dispara\"");
    }

    #[test]
    fn format_title_keeps_portuguese_words_that_look_like_acronyms() {
        assert_eq!(format_title("ele ia comprar bitcoin"), "Ele ia comprar Bitcoin");
    }

    #[test]
    fn reading_time_rounds_up_and_is_zero_for_empty_content() {
        assert_eq!(reading_time_minutes(""), 0);
        assert_eq!(reading_time_minutes("   \n "), 0);
        assert_eq!(reading_time_minutes("uma palavra"), 1);
        let words = std::iter::repeat_n("palavra", 201).collect::<Vec<_>>().join(" ");
        assert_eq!(reading_time_minutes(&words), 2);
    }

    #[test]
    fn sanitize_search_query_strips_markup_and_punctuation() {
        let sanitized = sanitize_search_query("<script>alert(1)</script> bitcoin");
        assert_eq!(sanitized, "scriptalert(1)/script bitcoin");
        assert_eq!(sanitize_search_query("it's \"btc\"; drop\\\u{7}"), "its btc drop");
    }

    #[test]
    fn sanitize_search_query_caps_length() {
        let long = "a".repeat(500);
        assert_eq!(sanitize_search_query(&long).chars().count(), MAX_SEARCH_QUERY_CHARS);
        assert_eq!(sanitize_search_query("   "), "");
    }

    #[test]
    fn escape_json_ld_neutralizes_script_vectors() {
        assert_eq!(
            escape_json_ld(Some(r#"<img src=x onerror=alert(1)> & "javascript:void(0)""#)),
            "&lt;img src=x alert(1)&gt; &amp; &quot;void(0)&quot;"
        );
        assert_eq!(escape_json_ld(None), "");
    }

    #[test]
    fn clean_meta_description_drops_title_prefix_and_truncates() {
        assert_eq!(clean_meta_description("**Título: Bitcoin** sobe"), "Bitcoin sobe");
        let long = "palavra ".repeat(40);
        let cleaned = clean_meta_description(&long);
        assert!(cleaned.ends_with("..."));
        assert_eq!(cleaned.chars().count(), META_DESCRIPTION_CHARS + 3);
    }

    #[test]
    fn truncate_chars_counts_characters_not_bytes() {
        assert_eq!(truncate_chars("regulação", 20), "regulação");
        assert_eq!(truncate_chars("regulação cripto", 9), "regulação...");
        assert_eq!(truncate_chars("a b c", 2), "a...");
    }

    #[test]
    fn remove_duplicate_title_only_drops_repeated_first_line() {
        let content = "# Bitcoin sobe\nCorpo do texto.";
        assert_eq!(remove_duplicate_title(content, "Bitcoin sobe"), "Corpo do texto.");
        assert_eq!(remove_duplicate_title("Título: algo\nCorpo", "Outro"), "Corpo");
        assert_eq!(remove_duplicate_title("Corpo\nmais", "Bitcoin"), "Corpo\nmais");
        assert_eq!(remove_duplicate_title("Corpo", ""), "Corpo");
    }

    #[test]
    fn format_date_uses_portuguese_months() {
        let date = Utc.with_ymd_and_hms(2026, 3, 5, 12, 0, 0).single().expect("date");
        assert_eq!(format_date(&date, DateStyle::Long), "05 de março de 2026");
        assert_eq!(format_date(&date, DateStyle::Short), "05 de mar.");
        assert_eq!(format_date_str("2026-10-17T09:00:00Z", DateStyle::Long), "17 de outubro de 2026");
        assert_eq!(format_date_str("amanhã", DateStyle::Long), "amanhã");
    }

    #[test]
    fn fold_for_search_removes_accents() {
        assert_eq!(fold_for_search("  Regulação NO Japão "), "regulacao no japao");
    }
}
