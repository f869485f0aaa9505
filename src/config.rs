use std::env::var;

use dotenvy::dotenv;

pub struct Config {
    pub port: u16,
    pub scheme: String,
    pub host: String,
    pub database_url: Option<String>,
    pub evolution_api_url: String,
    pub evolution_api_key: String,
    pub jwt_secret: String,
}

impl Config {
    pub fn try_parse() -> Result<Config, &'static str> {
        let _ = dotenv();

        Ok(Config {
            port: var("PORT")
                .map_err(|_| "An error occured while getting PORT env param")?
                .parse::<u16>()
                .map_err(|_| "An error occured while parsing PORT env param")?,
            scheme: var("SCHEME").map_err(|_| "An error occured while getting SCHEME env param")?,
            host: var("HOST").map_err(|_| "An error occured while getting HOST env param")?,
            database_url: var("DATABASE_URL").ok(),
            evolution_api_url: var("EVOLUTION_API_URL")
                .map_err(|_| "An error occured while getting EVOLUTION_API_URL env param")?,
            evolution_api_key: var("EVOLUTION_API_KEY")
                .map_err(|_| "An error occured while getting EVOLUTION_API_KEY env param")?,
            jwt_secret: var("JWT_SECRET")
                .map_err(|_| "An error occured while getting JWT_SECRET env param")?,
        })
    }
}
