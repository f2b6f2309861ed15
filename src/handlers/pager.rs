use crate::models::ProductRecord;

/// Запас под заголовок страницы и кнопки навигации: жесткий потолок
/// Telegram — 4096 символов.
pub const PAGE_CHAR_BUDGET: usize = 3500;
pub const MESSAGE_HARD_LIMIT: usize = 4096;

const FIRST_PAGE_HEADER: &str = "📦 Продукты на складе:\n\n";
const CONTINUATION_HEADER: &str = "📦 Продолжение:\n\n";

/// Карточка товара фиксированным шаблоном; отсутствующие поля
/// заменяются детерминированными заглушками.
pub fn render_product_block(product: &ProductRecord) -> String {
    let id = product
        .id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "N/A".to_string());
    let name = product.name.as_deref().unwrap_or("Без названия");
    let sku = product.sku.as_deref().unwrap_or("Не указан");
    let category = product.category_name.as_deref().unwrap_or("Не указана");
    let quantity = product.total_quantity.unwrap_or(0);
    let price = product.base_price.unwrap_or(0.0);
    let separator = "─".repeat(20);

    format!(
        "ID: {id}\n\
         Название: {name}\n\
         Артикул: {sku}\n\
         Категория: {category}\n\
         Количество: {quantity}\n\
         Цена: ${price:.2}\n\
         {separator}\n"
    )
}

/// Режет выдачу на страницы, каждая не длиннее `budget` символов.
/// Карточка, не влезающая в текущую страницу, открывает следующую с
/// заголовком продолжения; карточка длиннее самой страницы обрезается,
/// чтобы потолок держался для любой страницы.
pub fn paginate(products: &[ProductRecord], budget: usize) -> Vec<String> {
    let block_cap = budget.saturating_sub(FIRST_PAGE_HEADER.chars().count());
    let mut pages = Vec::new();
    let mut current = FIRST_PAGE_HEADER.to_string();
    let mut current_records = 0usize;

    for product in products {
        let mut block = render_product_block(product);
        if block.chars().count() > block_cap {
            block = truncate_message(&block, block_cap);
        }

        if current_records > 0 && current.chars().count() + block.chars().count() > budget {
            pages.push(current);
            current = format!("{CONTINUATION_HEADER}{block}");
            current_records = 1;
        } else {
            // Первая карточка всегда идет на страницу с заголовком,
            // страниц из одного заголовка не бывает.
            current.push_str(&block);
            current_records += 1;
        }
    }

    pages.push(current);
    pages
}

/// Обрезка одиночного сообщения до потолка Telegram.
pub fn truncate_message(text: &str, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        return text.to_string();
    }

    let mut truncated: String = text.chars().take(max_length.saturating_sub(100)).collect();
    truncated.push_str("\n\n... (сообщение обрезано)");
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: i64) -> ProductRecord {
        ProductRecord {
            id: Some(id),
            name: Some(format!("Термокружка №{id}")),
            sku: Some(format!("CUP-{id:04}")),
            category_name: Some("Посуда".to_string()),
            base_price: Some(45.99),
            total_quantity: Some(100),
            ..ProductRecord::default()
        }
    }

    #[test]
    fn missing_fields_render_placeholders() {
        let block = render_product_block(&ProductRecord::default());

        assert!(block.contains("ID: N/A"));
        assert!(block.contains("Название: Без названия"));
        assert!(block.contains("Артикул: Не указан"));
        assert!(block.contains("Категория: Не указана"));
        assert!(block.contains("Количество: 0"));
        assert!(block.contains("Цена: $0.00"));
    }

    #[test]
    fn every_page_fits_the_budget() {
        let products: Vec<_> = (1..=200).map(product).collect();
        let pages = paginate(&products, PAGE_CHAR_BUDGET);

        assert!(pages.len() > 1);
        for page in &pages {
            assert!(page.chars().count() <= PAGE_CHAR_BUDGET);
        }
    }

    #[test]
    fn no_record_is_lost_or_duplicated() {
        let products: Vec<_> = (1..=150).map(product).collect();
        let pages = paginate(&products, PAGE_CHAR_BUDGET);

        let joined = pages.concat();
        for id in 1..=150 {
            assert_eq!(joined.matches(&format!("ID: {id}\n")).count(), 1);
        }
    }

    #[test]
    fn oversized_block_is_clamped_to_the_budget() {
        let mut giant = product(1);
        giant.name = Some("Т".repeat(5000));

        let pages = paginate(&[giant], PAGE_CHAR_BUDGET);

        assert_eq!(pages.len(), 1);
        assert!(pages[0].chars().count() <= PAGE_CHAR_BUDGET);
        assert!(pages[0].starts_with("📦 Продукты на складе:"));
        assert!(pages[0].contains("ID: 1"));
        assert!(pages[0].contains("... (сообщение обрезано)"));
    }

    #[test]
    fn oversized_blocks_never_break_the_budget_or_leave_empty_pages() {
        let mut products: Vec<_> = (1..=50).map(product).collect();
        products[0].name = Some("Т".repeat(5000));
        products[25].name = Some("Т".repeat(8000));

        let pages = paginate(&products, PAGE_CHAR_BUDGET);

        assert!(pages.len() > 1);
        for page in &pages {
            assert!(page.chars().count() <= PAGE_CHAR_BUDGET);
            assert!(page.contains("ID: "));
        }
    }

    #[test]
    fn pagination_is_deterministic() {
        let products: Vec<_> = (1..=80).map(product).collect();
        assert_eq!(
            paginate(&products, PAGE_CHAR_BUDGET),
            paginate(&products, PAGE_CHAR_BUDGET)
        );
    }

    #[test]
    fn continuation_pages_are_marked() {
        let products: Vec<_> = (1..=200).map(product).collect();
        let pages = paginate(&products, PAGE_CHAR_BUDGET);

        assert!(pages[0].starts_with("📦 Продукты на складе:"));
        for page in &pages[1..] {
            assert!(page.starts_with("📦 Продолжение:"));
        }
    }

    #[test]
    fn short_message_is_untouched() {
        assert_eq!(truncate_message("привет", MESSAGE_HARD_LIMIT), "привет");
    }

    #[test]
    fn long_message_is_clamped_with_notice() {
        let long = "x".repeat(5000);
        let truncated = truncate_message(&long, MESSAGE_HARD_LIMIT);

        assert!(truncated.chars().count() <= MESSAGE_HARD_LIMIT);
        assert!(truncated.ends_with("... (сообщение обрезано)"));
    }

    #[test]
    fn tiny_limit_does_not_panic() {
        let truncated = truncate_message("достаточно длинный текст", 10);
        assert!(truncated.ends_with("... (сообщение обрезано)"));
    }
}
