// src/pricing/format.rs

//! Formatação de moeda (BRL) e percentual para exibição.
//!
//! A saída segue o `Intl.NumberFormat` com o espaço não separável já
//! normalizado para espaço comum: `R$ 1.234,56` em pt-BR.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ToSchema)]
pub enum FormatLocale {
    #[default]
    #[serde(rename = "pt-BR")]
    PtBr,
    #[serde(rename = "en-US")]
    EnUs,
}

impl FormatLocale {
    /// "pt", "pt-BR" -> PtBr; "en", "en-US" -> EnUs; qualquer outro -> padrão.
    pub fn from_language_tag(tag: &str) -> Self {
        let language = tag.split(['-', '_']).next().unwrap_or(tag);
        match language.to_ascii_lowercase().as_str() {
            "en" => FormatLocale::EnUs,
            _ => FormatLocale::PtBr,
        }
    }

    fn separators(self) -> (char, char) {
        match self {
            FormatLocale::PtBr => ('.', ','),
            FormatLocale::EnUs => (',', '.'),
        }
    }
}

/// Valor em reais: `R$ 1.234,56` (pt-BR) ou `R$1,234.56` (en-US).
pub fn format_currency(value: Decimal, locale: FormatLocale) -> String {
    let (negative, digits) = two_places(value, locale);
    let symbol = match locale {
        FormatLocale::PtBr => "R$ ",
        FormatLocale::EnUs => "R$",
    };
    let sign = if negative { "-" } else { "" };
    format!("{sign}{symbol}{digits}")
}

/// Percentual já em escala 0–100: `12,50%` (pt-BR) ou `12.50%` (en-US).
pub fn format_percent(value: Decimal, locale: FormatLocale) -> String {
    let (negative, digits) = two_places(value, locale);
    let sign = if negative { "-" } else { "" };
    format!("{sign}{digits}%")
}

/// Arredonda para duas casas e aplica os separadores do locale.
fn two_places(value: Decimal, locale: FormatLocale) -> (bool, String) {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    rounded = rounded.abs();
    rounded.rescale(2);

    let plain = rounded.to_string();
    let (integer, fraction) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));
    let (thousands, decimal) = locale.separators();

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, ch) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(thousands);
        }
        grouped.push(ch);
    }

    (negative, format!("{grouped}{decimal}{fraction}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn moeda_em_pt_br() {
        assert_eq!(format_currency(dec!(1234.56), FormatLocale::PtBr), "R$ 1.234,56");
        assert_eq!(format_currency(dec!(0), FormatLocale::PtBr), "R$ 0,00");
        assert_eq!(format_currency(dec!(99.9), FormatLocale::PtBr), "R$ 99,90");
        assert_eq!(format_currency(dec!(1234567.891), FormatLocale::PtBr), "R$ 1.234.567,89");
        assert_eq!(format_currency(dec!(-10.5), FormatLocale::PtBr), "-R$ 10,50");
        assert_eq!(format_currency(dec!(2.675), FormatLocale::PtBr), "R$ 2,68");
    }

    #[test]
    fn moeda_em_en_us() {
        assert_eq!(format_currency(dec!(1234.56), FormatLocale::EnUs), "R$1,234.56");
        assert_eq!(format_currency(dec!(-0.004), FormatLocale::EnUs), "R$0.00");
    }

    #[test]
    fn percentual() {
        assert_eq!(format_percent(dec!(12.5), FormatLocale::PtBr), "12,50%");
        assert_eq!(format_percent(dec!(28), FormatLocale::EnUs), "28.00%");
        assert_eq!(format_percent(dec!(-3.256), FormatLocale::PtBr), "-3,26%");
        assert_eq!(format_percent(dec!(1500), FormatLocale::PtBr), "1.500,00%");
    }

    #[test]
    fn locale_a_partir_do_cabecalho() {
        assert_eq!(FormatLocale::from_language_tag("pt-BR"), FormatLocale::PtBr);
        assert_eq!(FormatLocale::from_language_tag("en"), FormatLocale::EnUs);
        assert_eq!(FormatLocale::from_language_tag("EN-us"), FormatLocale::EnUs);
        assert_eq!(FormatLocale::from_language_tag("fr"), FormatLocale::PtBr);
    }
}
