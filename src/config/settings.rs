use serde::Deserialize;

/// Top-level configuration settings for the application.
///
/// Includes settings for both the listener and the broker.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub broker: BrokerSettings,
}

/// Configuration settings for the server.
///
/// Defines the host and port the server will bind to.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Configuration settings for the broker.
///
/// Holds the shared secret required by `connect`, the connection cap and the
/// longest request line accepted.
#[derive(Debug, Deserialize, Clone)]
pub struct BrokerSettings {
    pub secret: String,
    pub max_connections: usize,
    pub max_line_length: usize,
}

/// Partial configuration settings loaded from files or environment.
///
/// Allows partial specification of settings. Missing values can be filled using defaults.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub server: Option<PartialServerSettings>,
    pub broker: Option<PartialBrokerSettings>,
}

#[derive(Debug, Deserialize)]
pub struct PartialServerSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Deserialize)]
pub struct PartialBrokerSettings {
    pub secret: Option<String>,
    pub max_connections: Option<usize>,
    pub max_line_length: Option<usize>,
}

impl PartialSettings {
    /// Fills every missing value from `default`.
    pub fn merge(self, default: Settings) -> Settings {
        let server = self.server;
        let broker = self.broker;

        Settings {
            server: ServerSettings {
                host: server
                    .as_ref()
                    .and_then(|s| s.host.clone())
                    .unwrap_or(default.server.host),
                port: server
                    .as_ref()
                    .and_then(|s| s.port)
                    .unwrap_or(default.server.port),
            },
            broker: BrokerSettings {
                secret: broker
                    .as_ref()
                    .and_then(|b| b.secret.clone())
                    .unwrap_or(default.broker.secret),
                max_connections: broker
                    .as_ref()
                    .and_then(|b| b.max_connections)
                    .unwrap_or(default.broker.max_connections),
                max_line_length: broker
                    .as_ref()
                    .and_then(|b| b.max_line_length)
                    .unwrap_or(default.broker.max_line_length),
            },
        }
    }
}

/// Provides default values for `Settings`.
impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port: 3333,
            },
            broker: BrokerSettings {
                secret: "somesecret".to_string(),
                max_connections: 1000,
                max_line_length: 4096,
            },
        }
    }
}
