use serde::Deserialize;

#[derive(Deserialize, Clone)]
pub struct DbConfig {
    pub user: String,
    pub password: String,
    pub dbname: String,
    pub host: String,
    pub port: u16,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            user: "postgres".into(),
            password: "postgres".into(),
            dbname: "mint-backend-db".into(),
            host: "127.0.0.1".into(),
            port: 5432,
        }
    }
}
