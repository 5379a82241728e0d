use crate::models::SearchResult;
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Span {
    Plain(String),
    Strong(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TextBlock {
    Break,
    Header(Vec<Span>),
    ListItem(Vec<Span>),
    Paragraph(Vec<Span>),
}

fn strong_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\*\*.*?\*\*").expect("static bold pattern compiles"))
}

pub fn parse_inline(content: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut cursor = 0;

    for found in strong_pattern().find_iter(content) {
        if found.start() > cursor {
            spans.push(Span::Plain(content[cursor..found.start()].to_string()));
        }
        let inner = &found.as_str()[2..found.as_str().len() - 2];
        spans.push(Span::Strong(inner.to_string()));
        cursor = found.end();
    }

    if cursor < content.len() {
        spans.push(Span::Plain(content[cursor..].to_string()));
    }

    spans
}

/// Line-oriented markdown subset used for the model's answer.
pub fn format_answer(text: &str) -> Vec<TextBlock> {
    text.split('\n')
        .map(|line| {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                TextBlock::Break
            } else if trimmed.starts_with("**") && !trimmed.contains(':') {
                TextBlock::Header(parse_inline(trimmed))
            } else if let Some(item) = trimmed
                .strip_prefix("* ")
                .or_else(|| trimmed.strip_prefix("- "))
            {
                TextBlock::ListItem(parse_inline(item))
            } else {
                TextBlock::Paragraph(parse_inline(trimmed))
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlaceKind {
    Market,
    Pharmacy,
    Beauty,
    Other,
}

impl PlaceKind {
    pub fn label(self) -> &'static str {
        match self {
            PlaceKind::Market => "Mercado",
            PlaceKind::Pharmacy => "Farmácia",
            PlaceKind::Beauty => "Beleza",
            PlaceKind::Other => "Local",
        }
    }
}

const KIND_RULES: [(&[&str], PlaceKind); 3] = [
    (
        &["mercado", "super", "market", "carrefour", "extra", "dia"],
        PlaceKind::Market,
    ),
    (&["farma", "drogaria", "remedio"], PlaceKind::Pharmacy),
    (
        &["barber", "cabelo", "salao", "barba", "beauty"],
        PlaceKind::Beauty,
    ),
];

/// Best-effort guess from the title. First matching rule wins.
pub fn classify_place(title: &str) -> PlaceKind {
    let lowered = title.to_lowercase();
    KIND_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|keyword| lowered.contains(*keyword)))
        .map(|(_, kind)| *kind)
        .unwrap_or(PlaceKind::Other)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaceCard {
    pub title: String,
    pub uri: String,
    pub kind: PlaceKind,
}

pub fn place_cards(result: &SearchResult) -> Vec<PlaceCard> {
    result
        .places
        .iter()
        .filter(|place| !place.title.is_empty() && !place.uri.is_empty())
        .map(|place| PlaceCard {
            title: place.title.clone(),
            uri: place.uri.clone(),
            kind: classify_place(&place.title),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PlaceReference;

    fn plain(text: &str) -> Span {
        Span::Plain(text.to_string())
    }

    fn strong(text: &str) -> Span {
        Span::Strong(text.to_string())
    }

    #[test]
    fn inline_bold_spans_are_split_out() {
        assert_eq!(
            parse_inline("Vá ao **Pão de Açúcar** ou **Extra** hoje"),
            vec![
                plain("Vá ao "),
                strong("Pão de Açúcar"),
                plain(" ou "),
                strong("Extra"),
                plain(" hoje"),
            ]
        );
        assert_eq!(parse_inline("sem destaque"), vec![plain("sem destaque")]);
    }

    #[test]
    fn lines_map_to_blocks() {
        let blocks = format_answer(
            "**Farmácias próximas**\n\n* **Drogasil**: 200m\n- Droga Raia: 450m\n**Dica:** leve receita\ntexto",
        );

        assert_eq!(
            blocks,
            vec![
                TextBlock::Header(vec![strong("Farmácias próximas")]),
                TextBlock::Break,
                TextBlock::ListItem(vec![strong("Drogasil"), plain(": 200m")]),
                TextBlock::ListItem(vec![plain("Droga Raia: 450m")]),
                TextBlock::Paragraph(vec![strong("Dica:"), plain(" leve receita")]),
                TextBlock::Paragraph(vec![plain("texto")]),
            ]
        );
    }

    #[test]
    fn classification_is_order_sensitive() {
        assert_eq!(classify_place("Supermercado Dia"), PlaceKind::Market);
        assert_eq!(classify_place("Drogaria São Paulo"), PlaceKind::Pharmacy);
        assert_eq!(classify_place("Barbearia Corleone"), PlaceKind::Beauty);
        assert_eq!(classify_place("Padaria Real"), PlaceKind::Other);
        // "Farmácia Extra" hits the market rule first.
        assert_eq!(classify_place("Farmácia Extra"), PlaceKind::Market);
        assert_eq!(PlaceKind::Other.label(), "Local");
    }

    #[test]
    fn cards_skip_places_without_link() {
        let result = SearchResult {
            text: "ok".to_string(),
            places: vec![
                PlaceReference {
                    title: "Salão Bella".to_string(),
                    uri: String::new(),
                    place_id: None,
                },
                PlaceReference {
                    title: "Barbearia Nova".to_string(),
                    uri: "https://maps.google.com/?cid=5".to_string(),
                    place_id: Some("places/abc".to_string()),
                },
            ],
        };

        let cards = place_cards(&result);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].kind, PlaceKind::Beauty);
    }
}
