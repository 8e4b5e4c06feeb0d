//! Общие типы данных между ядром восстановления товаров и его отображением
//! (CLI, GUI, тестовый стенд).

pub mod domain;
pub mod usecases;
