use serde::{Deserialize, Serialize};
use url::{form_urlencoded, Url};

use crate::registry::ModelName;

/// Points at one model of one training run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelReference {
    pub name: String,
    pub langpair: String,
    pub model_name: ModelName,
}

/// Dashboard view state, round-tripped through the page URL.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiState {
    pub search_string: String,
    pub show_models: bool,
    pub show_corpora: bool,
    pub model_reference: Option<ModelReference>,
}

impl UiState {
    /// Read state from a dashboard URL or a bare query string. Unknown
    /// parameters are ignored and a partial model reference is dropped.
    pub fn from_query(input: &str) -> Self {
        let query = match Url::parse(input) {
            Ok(url) => url.query().unwrap_or_default().to_string(),
            Err(_) => input.trim_start_matches('?').to_string(),
        };

        let mut state = UiState::default();
        let mut name = None;
        let mut langpair = None;
        let mut model_name = None;

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "searchString" => state.search_string = value.into_owned(),
                "showModels" => state.show_models = value == "true",
                "showCorpora" => state.show_corpora = value == "true",
                "modelName" => name = Some(value.into_owned()),
                "modelLangpair" => langpair = Some(value.into_owned()),
                "modelModelName" => model_name = value.parse::<ModelName>().ok(),
                _ => {}
            }
        }

        if let (Some(name), Some(langpair), Some(model_name)) = (name, langpair, model_name) {
            if !name.is_empty() && !langpair.is_empty() {
                state.model_reference = Some(ModelReference {
                    name,
                    langpair,
                    model_name,
                });
            }
        }

        state
    }

    pub fn to_query(&self) -> String {
        let mut params = form_urlencoded::Serializer::new(String::new());
        params.append_pair("searchString", &self.search_string);
        if self.show_models {
            params.append_pair("showModels", "true");
        }
        if self.show_corpora {
            params.append_pair("showCorpora", "true");
        }
        if let Some(reference) = &self.model_reference {
            params.append_pair("modelName", &reference.name);
            params.append_pair("modelLangpair", &reference.langpair);
            params.append_pair("modelModelName", reference.model_name.as_str());
        }
        params.finish()
    }

    /// `base` with its query replaced by this state.
    pub fn to_link(&self, base: &Url) -> Url {
        let mut url = base.clone();
        url.set_query(Some(&self.to_query()));
        url
    }
}
