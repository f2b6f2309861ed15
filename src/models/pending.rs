/// Для чего ждем ввод ID: по номинальному состоянию диалога это не
/// определить, несколько сценариев проходят через один и тот же промпт.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdTarget {
    ProductLookup,
    ThermocupLookup,
    ThermocupUpdate,
    ReservedUpdate,
    StockUpdate,
}

/// Незавершенная многошаговая операция. Промежуточные ID лежат прямо в
/// варианте, поэтому поздний шаг не может выполниться без ранних.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingOp {
    AwaitingProductId(IdTarget),
    AwaitingSearchQuery,
    AwaitingCategory,
    AwaitingPriceRange,
    AwaitingThermocupData,
    AwaitingUpdateData { product_id: i64 },
    AwaitingReservedQuantity { product_id: i64 },
    AwaitingWarehouseId { product_id: i64 },
    AwaitingStockQuantity { product_id: i64, warehouse_id: i64 },
}
