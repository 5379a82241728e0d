use crate::models::{CategoryTag, GeoLocation, Radius, SearchFilters};
use serde::Serialize;

pub const DEFAULT_CATEGORY_CLAUSE: &str = "Mercado, Farmácia e Beleza (Barbearia/Salão)";
pub const NEARBY_DIRECTIVE: &str = "Busque nas proximidades imediatas.";

const CATEGORY_CONJUNCTION: &str = " e ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Tool {
    #[serde(rename = "googleMaps")]
    GoogleMaps,
}

/// Tools handed to the model. Maps grounding is always on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolConfig {
    pub tools: Vec<Tool>,
    pub retrieval_bias: Option<GeoLocation>,
}

impl ToolConfig {
    pub fn maps_grounding(retrieval_bias: Option<GeoLocation>) -> Self {
        Self {
            tools: vec![Tool::GoogleMaps],
            retrieval_bias,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromptPlan {
    pub prompt_text: String,
    pub tool_config: ToolConfig,
}

pub fn category_clause(categories: &[CategoryTag]) -> String {
    if categories.is_empty() {
        return DEFAULT_CATEGORY_CLAUSE.to_string();
    }

    categories
        .iter()
        .map(CategoryTag::display_phrase)
        .collect::<Vec<_>>()
        .join(CATEGORY_CONJUNCTION)
}

pub fn distance_clause(radius: Radius) -> String {
    if radius.is_bounded() {
        format!(
            "IMPORTANTE: Filtre rigorosamente locais num raio máximo de {radius} a partir do ponto de busca."
        )
    } else {
        NEARBY_DIRECTIVE.to_string()
    }
}

pub fn build_prompt(
    query: &str,
    filters: &SearchFilters,
    location: Option<GeoLocation>,
) -> PromptPlan {
    let categories = category_clause(&filters.categories);
    let distance = distance_clause(filters.radius);

    let prompt_text = format!(
        "Localização/Busca: \"{query}\".\n\
         \n\
         TAREFA:\n\
         Identifique e liste os melhores estabelecimentos APENAS nas seguintes categorias: {categories}.\n\
         {distance}\n\
         \n\
         REQUISITOS OBRIGATÓRIOS:\n\
         1. Use a ferramenta Google Maps para confirmar a existência real dos locais.\n\
         2. Você DEVE citar explicitamente os nomes dos locais encontrados para que eles gerem cartões interativos.\n\
         3. Na resposta de texto, para cada local, inclua a distância aproximada e um breve destaque.\n\
         4. Use **negrito** nos nomes dos estabelecimentos.\n\
         5. Se nenhum local for encontrado nas categorias selecionadas dentro da distância, avise claramente.\n\
         \n\
         Se a busca for muito vaga (ex: apenas um nome de rua sem número), procure no centro ou no ponto mais relevante dessa via.\n"
    );

    PromptPlan {
        prompt_text,
        tool_config: ToolConfig::maps_grounding(location),
    }
}
