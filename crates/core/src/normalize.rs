use crate::gemini::{GroundingChunk, RawModelResponse};
use crate::models::{PlaceReference, SearchResult};

pub const NO_RESULTS_TEXT: &str =
    "Não encontrei resultados específicos com estes filtros. Tente ampliar a busca.";

pub fn normalize(raw: &RawModelResponse) -> SearchResult {
    let text = raw
        .answer_text()
        .filter(|text| !text.trim().is_empty())
        .unwrap_or_else(|| NO_RESULTS_TEXT.to_string());

    SearchResult {
        text,
        places: place_references(raw.grounding_chunks()),
    }
}

/// Keeps map chunks with a non-empty title, in order.
pub fn place_references(chunks: &[GroundingChunk]) -> Vec<PlaceReference> {
    chunks
        .iter()
        .filter_map(|chunk| {
            let maps = chunk.maps.as_ref()?;
            let title = maps.title.as_deref().filter(|title| !title.is_empty())?;
            Some(PlaceReference {
                title: title.to_string(),
                uri: maps.uri.clone().unwrap_or_default(),
                place_id: maps.place_id.clone(),
            })
        })
        .collect()
}
