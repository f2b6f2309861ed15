use std::fmt;

use crate::models::{ThermocupAttributes, ThermocupDraft, ThermocupUpdate};

/// Ошибка разбора пользовательского ввода. Машина состояний решает по
/// тегу, перепросить ввод или двигаться дальше.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    NotAnInteger,
    EmptyInput,
    TooFewFields { required: usize, got: usize },
    BadNumber(&'static str),
    BadFlag(&'static str),
    BadPriceRange,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::NotAnInteger => write!(f, "Пожалуйста, введите целое число"),
            ValidationError::EmptyInput => write!(f, "Ввод не должен быть пустым"),
            ValidationError::TooFewFields { required, got } => {
                write!(f, "Нужно минимум {} поля, получено {}", required, got)
            }
            ValidationError::BadNumber(field) => {
                write!(f, "Поле «{}» должно быть числом", field)
            }
            ValidationError::BadFlag(field) => {
                write!(f, "Поле «{}» должно быть true или false", field)
            }
            ValidationError::BadPriceRange => {
                write!(
                    f,
                    "Неверный формат диапазона: укажите «минимум - максимум», любую границу можно оставить пустой"
                )
            }
        }
    }
}

pub fn parse_id(text: &str) -> Result<i64, ValidationError> {
    text.trim().parse().map_err(|_| ValidationError::NotAnInteger)
}

/// Изменение количества: положительное — прибавить, отрицательное — отнять.
pub fn parse_delta(text: &str) -> Result<i64, ValidationError> {
    text.trim().parse().map_err(|_| ValidationError::NotAnInteger)
}

pub fn parse_search_text(text: &str) -> Result<String, ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyInput);
    }
    Ok(trimmed.to_string())
}

/// Диапазон цен `<мин> - <макс>`; пустая сторона означает отсутствие
/// границы с этой стороны.
pub fn parse_price_range(text: &str) -> Result<(Option<f64>, Option<f64>), ValidationError> {
    let mut sides = text.splitn(2, '-');
    let min_part = sides.next().unwrap_or("").trim();
    let max_part = match sides.next() {
        Some(part) => part.trim(),
        None => return Err(ValidationError::BadPriceRange),
    };

    let parse_side = |part: &str| -> Result<Option<f64>, ValidationError> {
        if part.is_empty() {
            return Ok(None);
        }
        part.parse()
            .map(Some)
            .map_err(|_| ValidationError::BadPriceRange)
    };

    Ok((parse_side(min_part)?, parse_side(max_part)?))
}

/// Данные новой термокружки, одной строкой через `|`:
/// `Название | Категория ID | Цена | Количество | Склад ID | Фото | Объем | Цвет | Бренд`.
/// Обязательны первые четыре поля, остальные позиционны и имеют
/// детерминированные значения по умолчанию.
pub fn parse_thermocup_draft(text: &str) -> Result<ThermocupDraft, ValidationError> {
    let parts: Vec<&str> = text.split('|').map(str::trim).collect();

    if parts.len() < 4 {
        return Err(ValidationError::TooFewFields {
            required: 4,
            got: parts.len(),
        });
    }

    let name = parts[0].to_string();
    let category_id = parts[1]
        .parse()
        .map_err(|_| ValidationError::BadNumber("Категория ID"))?;
    let base_price = parts[2]
        .parse()
        .map_err(|_| ValidationError::BadNumber("Цена"))?;
    let initial_quantity = parts[3]
        .parse()
        .map_err(|_| ValidationError::BadNumber("Количество"))?;

    let warehouse_id = match parts.get(4) {
        Some(part) if !part.is_empty() => part
            .parse()
            .map_err(|_| ValidationError::BadNumber("Склад ID"))?,
        _ => 1,
    };
    let path_to_photo = parts.get(5).unwrap_or(&"").to_string();
    let volume_ml = match parts.get(6) {
        Some(part) if !part.is_empty() => part
            .parse()
            .map_err(|_| ValidationError::BadNumber("Объем"))?,
        _ => 500,
    };
    let color = match parts.get(7) {
        Some(part) if !part.is_empty() => part.to_string(),
        _ => "Черный".to_string(),
    };
    let brand = match parts.get(8) {
        Some(part) if !part.is_empty() => part.to_string(),
        _ => "Unknown".to_string(),
    };

    Ok(ThermocupDraft {
        category_id,
        base_price,
        initial_quantity,
        warehouse_id,
        path_to_photo,
        attributes: ThermocupAttributes {
            volume_ml,
            color,
            brand,
            model: name.clone(),
            is_hermetic: true,
            material: "Нержавеющая сталь".to_string(),
        },
        name,
    })
}

/// Обновление термокружки: `Название | Цена | SKU | Активен(true/false)`.
/// Все поля опциональны, пустое поле пропускается, а не сбрасывается.
pub fn parse_thermocup_update(text: &str) -> Result<ThermocupUpdate, ValidationError> {
    let parts: Vec<&str> = text.split('|').map(str::trim).collect();
    let mut update = ThermocupUpdate::default();

    if let Some(name) = parts.first().filter(|p| !p.is_empty()) {
        update.name = Some(name.to_string());
    }
    if let Some(price) = parts.get(1).filter(|p| !p.is_empty()) {
        update.base_price = Some(
            price
                .parse()
                .map_err(|_| ValidationError::BadNumber("Цена"))?,
        );
    }
    if let Some(sku) = parts.get(2).filter(|p| !p.is_empty()) {
        update.sku = Some(sku.to_string());
    }
    if let Some(flag) = parts.get(3).filter(|p| !p.is_empty()) {
        update.is_active = Some(match flag.to_lowercase().as_str() {
            "true" => true,
            "false" => false,
            _ => return Err(ValidationError::BadFlag("Активен")),
        });
    }

    Ok(update)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_must_be_an_integer() {
        assert_eq!(parse_id("42"), Ok(42));
        assert_eq!(parse_id(" 42 "), Ok(42));
        assert_eq!(parse_id("abc"), Err(ValidationError::NotAnInteger));
        assert_eq!(parse_id("4.2"), Err(ValidationError::NotAnInteger));
    }

    #[test]
    fn delta_accepts_signed_values() {
        assert_eq!(parse_delta("10"), Ok(10));
        assert_eq!(parse_delta("-5"), Ok(-5));
        assert_eq!(parse_delta("пять"), Err(ValidationError::NotAnInteger));
    }

    #[test]
    fn search_text_must_not_be_blank() {
        assert_eq!(parse_search_text("  stanley "), Ok("stanley".to_string()));
        assert_eq!(parse_search_text("   "), Err(ValidationError::EmptyInput));
    }

    #[test]
    fn price_range_allows_open_ends() {
        assert_eq!(parse_price_range("- 50"), Ok((None, Some(50.0))));
        assert_eq!(parse_price_range("100 -"), Ok((Some(100.0), None)));
        assert_eq!(parse_price_range("100-200"), Ok((Some(100.0), Some(200.0))));
    }

    #[test]
    fn price_range_rejects_garbage() {
        assert_eq!(parse_price_range("дорого"), Err(ValidationError::BadPriceRange));
        assert_eq!(
            parse_price_range("сто - 200"),
            Err(ValidationError::BadPriceRange)
        );
    }

    #[test]
    fn minimal_draft_gets_defaults() {
        let draft = parse_thermocup_draft("Mug | 1 | 9.99 | 10").unwrap();

        assert_eq!(draft.name, "Mug");
        assert_eq!(draft.category_id, 1);
        assert_eq!(draft.base_price, 9.99);
        assert_eq!(draft.initial_quantity, 10);
        assert_eq!(draft.warehouse_id, 1);
        assert_eq!(draft.path_to_photo, "");
        assert_eq!(draft.attributes.volume_ml, 500);
        assert_eq!(draft.attributes.color, "Черный");
        assert_eq!(draft.attributes.brand, "Unknown");
        assert_eq!(draft.attributes.model, "Mug");
        assert!(draft.attributes.is_hermetic);
    }

    #[test]
    fn full_draft_uses_all_fields() {
        let draft = parse_thermocup_draft(
            "Stanley Classic | 1 | 45.99 | 100 | 2 | /img/st.png | 750 | Зеленый | Stanley",
        )
        .unwrap();

        assert_eq!(draft.warehouse_id, 2);
        assert_eq!(draft.path_to_photo, "/img/st.png");
        assert_eq!(draft.attributes.volume_ml, 750);
        assert_eq!(draft.attributes.color, "Зеленый");
        assert_eq!(draft.attributes.brand, "Stanley");
    }

    #[test]
    fn short_draft_is_recoverable_error() {
        assert_eq!(
            parse_thermocup_draft("Mug | 1 | 9.99"),
            Err(ValidationError::TooFewFields { required: 4, got: 3 })
        );
    }

    #[test]
    fn draft_with_bad_number_is_rejected() {
        assert_eq!(
            parse_thermocup_draft("Mug | один | 9.99 | 10"),
            Err(ValidationError::BadNumber("Категория ID"))
        );
    }

    #[test]
    fn update_skips_empty_fields() {
        let update = parse_thermocup_update("| 49.99 ||").unwrap();

        assert_eq!(update.base_price, Some(49.99));
        assert!(update.name.is_none());
        assert!(update.sku.is_none());
        assert!(update.is_active.is_none());
    }

    #[test]
    fn update_parses_all_fields() {
        let update = parse_thermocup_update("Stanley New | 49.99 | STAN-002 | true").unwrap();

        assert_eq!(update.name.as_deref(), Some("Stanley New"));
        assert_eq!(update.base_price, Some(49.99));
        assert_eq!(update.sku.as_deref(), Some("STAN-002"));
        assert_eq!(update.is_active, Some(true));
        assert_eq!(
            update.changed_fields(),
            vec!["name", "base_price", "sku", "is_active"]
        );
    }

    #[test]
    fn update_rejects_non_boolean_flag() {
        assert_eq!(
            parse_thermocup_update("||| да"),
            Err(ValidationError::BadFlag("Активен"))
        );
    }

    #[test]
    fn empty_update_is_detectable() {
        let update = parse_thermocup_update("|||").unwrap();
        assert!(update.is_empty());
    }
}
