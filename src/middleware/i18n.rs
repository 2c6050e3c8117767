// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

use crate::pricing::format::FormatLocale;

// Extrator de idioma: escolhe o formato de moeda/percentual da resposta.
#[derive(Debug, Clone, Copy, Default)]
pub struct Locale(pub FormatLocale);

impl Locale {
    pub fn from_accept_language(header_str: Option<&str>) -> Self {
        let locale = header_str
            .and_then(|header_str| {
                accept_language::parse(header_str)
                    .first() // Pega o idioma preferido (ex: "pt-BR")
                    .map(|tag| FormatLocale::from_language_tag(tag))
            })
            .unwrap_or_default();

        Locale(locale)
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header_str = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|header_value| header_value.to_str().ok());

        Ok(Locale::from_accept_language(header_str))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idioma_preferido_define_o_formato() {
        assert_eq!(Locale::from_accept_language(Some("en-US,en;q=0.9,pt;q=0.5")).0, FormatLocale::EnUs);
        assert_eq!(Locale::from_accept_language(Some("pt-BR,pt;q=0.9")).0, FormatLocale::PtBr);
        assert_eq!(Locale::from_accept_language(Some("fr;q=0.3,en;q=0.8")).0, FormatLocale::EnUs);
    }

    #[test]
    fn sem_cabecalho_usa_pt_br() {
        assert_eq!(Locale::from_accept_language(None).0, FormatLocale::PtBr);
        assert_eq!(Locale::from_accept_language(Some("")).0, FormatLocale::PtBr);
    }
}
