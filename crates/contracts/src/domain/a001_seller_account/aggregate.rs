use serde::{Deserialize, Serialize};

/// Учетная запись продавца в OZON Seller API
///
/// Загружается один раз из конфигурации и не меняется до конца работы процесса.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Отображаемое имя магазина
    pub name: String,

    /// Client-Id
    pub client_id: String,

    /// Api-Key
    pub api_key: String,
}

impl Account {
    pub fn new(
        name: impl Into<String>,
        client_id: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            client_id: client_id.into(),
            api_key: api_key.into(),
        }
    }

    /// Проверка обязательных полей для OZON API
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Account name must not be empty".into());
        }
        if self.client_id.trim().is_empty() {
            return Err(format!("Client-Id is required for account '{}'", self.name));
        }
        if self.api_key.trim().is_empty() {
            return Err(format!("Api-Key is required for account '{}'", self.name));
        }
        Ok(())
    }
}

// Api-Key никогда не попадает в логи
impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("name", &self.name)
            .field("client_id", &self.client_id)
            .field("api_key", &"****")
            .finish()
    }
}
