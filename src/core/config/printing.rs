use crate::core::config::data::Config;

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

impl Config {
    pub fn print_all(&self) {
        println!("Current configuration:");
        match &self.server_url {
            Some(url) => println!("  server-url: {url}"),
            None => println!("  server-url: (unset, using {})", self.server_url()),
        }
        let endpoints = self.endpoints(None);
        println!("  send-path: {}", endpoints.send_path);
        println!("  clear-path: {}", endpoints.clear_path);
        match &self.theme {
            Some(theme) => println!("  theme: {theme}"),
            None => println!("  theme: (unset)"),
        }
        println!(
            "  typing-indicator: {}",
            on_off(self.typing_indicator_enabled())
        );
        println!("  syntax: {}", on_off(self.syntax_enabled()));
        println!("  load-history: {}", on_off(self.load_history_enabled()));
        match self.request_timeout_secs {
            Some(secs) if secs > 0 => println!("  request-timeout: {secs}s"),
            _ => println!("  request-timeout: (none)"),
        }
    }
}
