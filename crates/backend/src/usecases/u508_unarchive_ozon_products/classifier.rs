use super::event_sink::EventSink;
use contracts::usecases::u508_unarchive_ozon_products::{ProductRecord, ReportAction, ReportRow};
use std::collections::HashSet;

pub const MISSING_PRODUCT_ID_ERROR: &str = "В ответе API нет product_id, восстановление невозможно";

/// Решение по флагам архива, в порядке приоритета:
/// 1. в архиве, не автоархив → восстановить
/// 2. в архиве, автоархив → пропустить
/// 3. не в архиве → пропустить (флаг автоархива не учитывается)
pub fn decide(is_archived: bool, is_autoarchived: bool) -> ReportAction {
    match (is_archived, is_autoarchived) {
        (true, false) => ReportAction::ToUnarchive,
        (true, true) => ReportAction::SkippedAutoarchived,
        (false, _) => ReportAction::SkippedNotArchived,
    }
}

/// Итог классификации одного товара
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub row: ReportRow,
    /// product_id для восстановления (только для TO_UNARCHIVE)
    pub restore_id: Option<i64>,
}

pub fn classify(record: &ProductRecord, sink: &EventSink) -> Classification {
    let action = decide(record.is_archived, record.is_autoarchived);

    match (action, record.product_id) {
        (ReportAction::ToUnarchive, Some(product_id)) => {
            sink.info(format!("{} → Будет восстановлен", record.display_offer_id()));
            Classification {
                row: ReportRow::from_record(record, action),
                restore_id: Some(product_id),
            }
        }
        (ReportAction::ToUnarchive, None) => {
            sink.warn(format!("{} → Пропущен (нет product_id)", record.display_offer_id()));
            Classification {
                row: ReportRow::from_record(record, ReportAction::Skipped)
                    .with_error(MISSING_PRODUCT_ID_ERROR),
                restore_id: None,
            }
        }
        (ReportAction::SkippedAutoarchived, _) => {
            sink.info(format!("{} → Пропущен (автоархивирован)", record.display_offer_id()));
            Classification {
                row: ReportRow::from_record(record, action),
                restore_id: None,
            }
        }
        _ => {
            sink.info(format!("{} → Пропущен (не в архиве)", record.display_offer_id()));
            Classification {
                row: ReportRow::from_record(record, action),
                restore_id: None,
            }
        }
    }
}

/// Строки отчета и список product_id на восстановление, в порядке получения товаров
pub fn classify_all(records: &[ProductRecord], sink: &EventSink) -> (Vec<ReportRow>, Vec<i64>) {
    let mut rows = Vec::with_capacity(records.len());
    let mut to_unarchive = Vec::new();

    for record in records {
        let classification = classify(record, sink);
        if let Some(product_id) = classification.restore_id {
            to_unarchive.push(product_id);
        }
        rows.push(classification.row);
    }

    (rows, to_unarchive)
}

/// NOT_FOUND для каждого входного offer_id, которого нет среди полученных товаров.
/// Сравнение точное; дубликаты во входе дают по строке на каждое вхождение.
pub fn not_found_rows(offer_ids: &[String], records: &[ProductRecord]) -> Vec<ReportRow> {
    let found: HashSet<&str> = records
        .iter()
        .filter_map(|r| r.offer_id.as_deref())
        .collect();
    offer_ids
        .iter()
        .filter(|offer_id| !found.contains(offer_id.as_str()))
        .map(ReportRow::not_found)
        .collect()
}
