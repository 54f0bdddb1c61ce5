use crate::{
    error::AppResult,
    models::Language,
    response::{ApiResponse, Meta},
    state::AppState,
    store::{SharedStore, StoreResult, keys, write_json},
};

/// Current UI locale, persisted under `language`.
pub struct LanguageSwitch {
    store: SharedStore,
    language: Language,
}

impl LanguageSwitch {
    /// Accepts both `"fr"` and a bare `fr`; anything else falls back to English.
    pub fn hydrate(store: SharedStore) -> Self {
        let language = match store.get(keys::LANGUAGE) {
            Ok(Some(entry)) => {
                let raw = serde_json::from_str::<String>(&entry.value).unwrap_or(entry.value);
                Language::parse(raw.trim()).unwrap_or_default()
            }
            Ok(None) => Language::default(),
            Err(err) => {
                tracing::warn!(error = %err, "language unreadable, using default");
                Language::default()
            }
        };
        Self { store, language }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn set_language(&mut self, language: Language) -> StoreResult<()> {
        write_json(self.store.as_ref(), keys::LANGUAGE, &language)?;
        self.language = language;
        Ok(())
    }

    pub fn t<'a>(&self, en: &'a str, fr: &'a str) -> &'a str {
        self.language.pick(en, fr)
    }
}

pub async fn get_language(state: &AppState) -> AppResult<ApiResponse<Language>> {
    let language = state.language.lock().await.language();
    Ok(ApiResponse::ok(language))
}

pub async fn set_language(state: &AppState, language: Language) -> AppResult<ApiResponse<Language>> {
    let mut switch = state.language.lock().await;
    switch.set_language(language)?;
    tracing::info!(language = language.as_str(), "language changed");
    Ok(ApiResponse::success(
        switch.t("Language updated", "Langue mise à jour"),
        language,
        Some(Meta::empty()),
    ))
}
