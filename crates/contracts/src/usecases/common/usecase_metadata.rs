/// Метаданные UseCase для идентификации и документирования
pub trait UseCaseMetadata {
    /// Индекс UseCase (например, "u508")
    fn usecase_index() -> &'static str;

    /// Техническое имя (например, "unarchive_ozon_products")
    fn usecase_name() -> &'static str;

    /// Отображаемое имя для пользователя
    fn display_name() -> &'static str;

    fn description() -> &'static str {
        ""
    }

    /// Полное имя вида "u508_unarchive_ozon_products"
    fn full_name() -> String {
        format!("{}_{}", Self::usecase_index(), Self::usecase_name())
    }
}
