//! Display formatting for the admin screens: BRL amounts, dates and the
//! usual Brazilian document masks.

use chrono::{DateTime, NaiveDate, TimeZone};

/// Format an amount in centavos as `R$ 1.234,56`.
pub fn format_brl(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let reais = (abs / 100).to_string();
    let centavos = abs % 100;

    let mut grouped = String::with_capacity(reais.len() + reais.len() / 3);
    for (i, ch) in reais.chars().enumerate() {
        if i > 0 && (reais.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    format!("{sign}R$ {grouped},{centavos:02}")
}

/// `dd/mm/aaaa`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// `dd/mm/aaaa HH:MM` in the timestamp's own offset
pub fn format_datetime<Tz>(value: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    value.format("%d/%m/%Y %H:%M").to_string()
}

/// Reformat an RFC 3339 timestamp coming from the API as `dd/mm/aaaa`.
///
/// Returns `None` when the input does not parse.
pub fn format_api_date(raw: &str) -> Option<String> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| format_date(dt.date_naive()))
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .map(format_date)
        })
}

pub fn digits_only(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// Apply a mask where `#` takes the next digit. Input that does not have
/// exactly as many digits as the mask is returned as bare digits.
fn apply_mask(value: &str, mask: &str) -> String {
    let digits = digits_only(value);
    if digits.len() != mask.matches('#').count() {
        return digits;
    }

    let mut source = digits.chars();
    mask.chars()
        .map(|m| if m == '#' { source.next().unwrap_or(m) } else { m })
        .collect()
}

/// `000.000.000-00`
pub fn mask_cpf(value: &str) -> String {
    apply_mask(value, "###.###.###-##")
}

/// `00.000.000/0000-00`
pub fn mask_cnpj(value: &str) -> String {
    apply_mask(value, "##.###.###/####-##")
}

/// `00000-000`
pub fn mask_cep(value: &str) -> String {
    apply_mask(value, "#####-###")
}

/// `(00) 00000-0000` for mobiles, `(00) 0000-0000` for landlines
pub fn mask_phone(value: &str) -> String {
    match digits_only(value).len() {
        11 => apply_mask(value, "(##) #####-####"),
        _ => apply_mask(value, "(##) ####-####"),
    }
}

/// Licence plates: old `ABC-1234` style gets its dash, Mercosul `ABC1D23`
/// stays as is. Anything else is only uppercased.
pub fn mask_plate(value: &str) -> String {
    let plate: String = value
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .collect();

    let bytes = plate.as_bytes();
    let well_formed = bytes.len() == 7
        && bytes[..3].iter().all(u8::is_ascii_alphabetic)
        && bytes[3].is_ascii_digit()
        && bytes[5..].iter().all(u8::is_ascii_digit);

    if well_formed && bytes[4].is_ascii_digit() {
        format!("{}-{}", &plate[..3], &plate[3..])
    } else {
        plate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    #[test]
    fn brl_amounts() {
        assert_eq!(format_brl(0), "R$ 0,00");
        assert_eq!(format_brl(5), "R$ 0,05");
        assert_eq!(format_brl(4990), "R$ 49,90");
        assert_eq!(format_brl(123_456), "R$ 1.234,56");
        assert_eq!(format_brl(100_000_000), "R$ 1.000.000,00");
        assert_eq!(format_brl(-1500), "-R$ 15,00");
    }

    #[test]
    fn dates() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(format_date(date), "07/03/2024");

        let dt = Utc.with_ymd_and_hms(2024, 12, 31, 23, 5, 0).unwrap();
        assert_eq!(format_datetime(&dt), "31/12/2024 23:05");

        let brt = FixedOffset::west_opt(3 * 3600).unwrap();
        assert_eq!(format_datetime(&dt.with_timezone(&brt)), "31/12/2024 20:05");

        assert_eq!(
            format_api_date("2024-05-01T10:00:00.000Z").as_deref(),
            Some("01/05/2024")
        );
        assert_eq!(format_api_date("2024-05-01").as_deref(), Some("01/05/2024"));
        assert_eq!(format_api_date("ontem"), None);
    }

    #[test]
    fn document_masks() {
        assert_eq!(mask_cpf("52998224725"), "529.982.247-25");
        assert_eq!(mask_cpf("529.982.247-25"), "529.982.247-25");
        assert_eq!(mask_cpf("5299"), "5299");
        assert_eq!(mask_cnpj("11222333000181"), "11.222.333/0001-81");
        assert_eq!(mask_cep("01310100"), "01310-100");
    }

    #[test]
    fn phone_masks() {
        assert_eq!(mask_phone("11987654321"), "(11) 98765-4321");
        assert_eq!(mask_phone("1134567890"), "(11) 3456-7890");
        assert_eq!(mask_phone("12"), "12");
    }

    #[test]
    fn plates() {
        assert_eq!(mask_plate("abc1234"), "ABC-1234");
        assert_eq!(mask_plate("ABC-1234"), "ABC-1234");
        assert_eq!(mask_plate("bra2e19"), "BRA2E19");
        assert_eq!(mask_plate("xyz"), "XYZ");
    }
}
