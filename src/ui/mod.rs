//! Interactive shell over the session state machine
//!
//! A line-oriented rendering of the single-page UI: a role picker while
//! logged out, then a dashboard with a track panel and, for supply-chain
//! roles, an add panel. Pending notices block the prompt until
//! acknowledged.
//!
//! The shell renders either from the static demo catalog (primary path) or
//! through the fetcher -> contract -> node path when a ledger is configured.

pub mod form;
pub mod tracker;

pub use form::{render_form, FormField, ProductForm, Submission};
pub use tracker::{render_product, ScoreBand, SearchOutcome, Tracker};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::debug;

use crate::catalog::ProductCatalog;
use crate::fetch::ProductFetcher;
use crate::session::{Panel, Session};
use crate::types::Role;

/// Where the track panel gets its products from
pub enum DataSource {
    /// Static demo catalog, reset on every start
    Catalog(ProductCatalog),
    /// Live reads through the contract client
    Ledger(ProductFetcher),
}

/// One dispatched command's result
#[derive(Debug, PartialEq, Eq)]
pub struct Reply {
    pub output: String,
    pub quit: bool,
}

impl Reply {
    fn text(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            quit: false,
        }
    }

    fn quit() -> Self {
        Self {
            output: "Goodbye.".to_string(),
            quit: true,
        }
    }
}

/// The application shell: session plus data source
pub struct App {
    session: Session,
    source: DataSource,
}

impl App {
    pub fn new(source: DataSource) -> Self {
        Self {
            session: Session::new(),
            source,
        }
    }

    /// The underlying session (read-only)
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Mutable access to the underlying session
    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Dispatch one input line
    pub async fn dispatch(&mut self, line: &str) -> Reply {
        let line = line.trim();
        debug!(line = %line, "shell input");

        if line.is_empty() {
            return Reply::text(self.render_screen());
        }
        if line == "quit" || line == "exit" {
            return Reply::quit();
        }
        if line == "help" {
            return Reply::text(self.render_help());
        }

        if self.session.is_authenticated() {
            self.dispatch_dashboard(line).await
        } else {
            self.dispatch_login(line)
        }
    }

    fn dispatch_login(&mut self, line: &str) -> Reply {
        let role_name = line.strip_prefix("login").map(str::trim).unwrap_or(line);
        match role_name.parse::<Role>() {
            Ok(role) => {
                self.session.login(role);
                Reply::text(self.render_screen())
            }
            Err(_) => Reply::text(format!(
                "Unknown role '{role_name}'. Pick one of: {}",
                role_list()
            )),
        }
    }

    async fn dispatch_dashboard(&mut self, line: &str) -> Reply {
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        match command {
            "logout" => {
                self.session.logout();
                Reply::text(self.render_screen())
            }
            "track" => {
                // Track is open to every role
                self.dashboard().open_panel(Panel::Track);
                Reply::text(self.render_screen())
            }
            "add" => {
                if self.dashboard().open_panel(Panel::Add) {
                    Reply::text(self.render_screen())
                } else {
                    Reply::text("The add panel requires a supply-chain role.")
                }
            }
            "search" => self.search(rest).await,
            "set" => match rest.split_once(char::is_whitespace) {
                Some((field, value)) => self.set_field(field, value.trim()),
                None => Reply::text("Usage: set <name|origin|date|details> <value>"),
            },
            "submit" => self.submit_form(),
            "show" => Reply::text(self.render_screen()),
            _ => Reply::text(format!("Unknown command '{command}'. Try 'help'.")),
        }
    }

    async fn search(&mut self, query: &str) -> Reply {
        self.dashboard().open_panel(Panel::Track);
        self.dashboard().tracker.set_query(query);

        match self.source {
            DataSource::Catalog(ref catalog) => {
                let dashboard = self
                    .session
                    .dashboard_mut()
                    .expect("dashboard present while dispatching");
                match dashboard.search_catalog(catalog) {
                    SearchOutcome::Found => {
                        let product = dashboard.tracker.product().expect("product just found");
                        Reply::text(render_product(product))
                    }
                    // The pending notice blocks the next prompt
                    SearchOutcome::NotFound => Reply::text(String::new()),
                }
            }
            DataSource::Ledger(ref mut fetcher) => {
                let fetched = fetcher.get_product(query).await;
                let error = fetcher.error().map(str::to_string);
                let dashboard = self
                    .session
                    .dashboard_mut()
                    .expect("dashboard present while dispatching");
                match fetched {
                    Some(product) => {
                        let rendered = render_product(&product);
                        dashboard.tracker.show(product);
                        Reply::text(rendered)
                    }
                    None => {
                        dashboard.tracker.clear();
                        Reply::text(format!(
                            "Error: {}",
                            error.unwrap_or_else(|| "Failed to fetch product data".to_string())
                        ))
                    }
                }
            }
        }
    }

    fn set_field(&mut self, field: &str, value: &str) -> Reply {
        if self.dashboard().active_panel() != Panel::Add {
            return Reply::text("Open the add panel first.");
        }
        match field.parse::<FormField>() {
            Ok(field) => {
                self.dashboard().form.set(field, value);
                Reply::text(render_form(&self.dashboard().form))
            }
            Err(e) => Reply::text(e.to_string()),
        }
    }

    fn submit_form(&mut self) -> Reply {
        if self.dashboard().active_panel() != Panel::Add {
            return Reply::text("Open the add panel first.");
        }
        let _submission = self.dashboard().form.submit();
        self.dashboard().raise_notice("Product added successfully!");
        Reply::text(String::new())
    }

    fn dashboard(&mut self) -> &mut crate::session::Dashboard {
        self.session
            .dashboard_mut()
            .expect("dashboard present while dispatching")
    }

    fn render_screen(&self) -> String {
        match self.session.dashboard() {
            None => format!(
                "AgriChain - supply-chain traceability\nLog in as one of: {}\n",
                role_list()
            ),
            Some(dashboard) => {
                let mut out = format!(
                    "AgriChain - logged in as {}\nPanels: track{}\n",
                    dashboard.role().label(),
                    if crate::session::is_panel_allowed(Panel::Add, dashboard.role()) {
                        ", add"
                    } else {
                        ""
                    }
                );
                match dashboard.active_panel() {
                    Panel::Track => match dashboard.tracker.product() {
                        Some(product) => out.push_str(&render_product(product)),
                        None => out.push_str("Enter 'search <product id>' (try PROD123)\n"),
                    },
                    Panel::Add => out.push_str(&render_form(&dashboard.form)),
                }
                out
            }
        }
    }

    fn render_help(&self) -> String {
        if self.session.is_authenticated() {
            "Commands: track | add | search <id> | set <field> <value> | submit | show | logout | quit"
                .to_string()
        } else {
            format!("Commands: login <role> | quit. Roles: {}", role_list())
        }
    }

    /// Run the interactive loop over stdin, blocking on pending notices
    pub async fn run(&mut self) -> std::io::Result<()> {
        let stdin = BufReader::new(tokio::io::stdin());
        let mut lines = stdin.lines();
        let mut stdout = tokio::io::stdout();

        stdout
            .write_all(format!("{}\n> ", self.render_screen()).as_bytes())
            .await?;
        stdout.flush().await?;

        while let Some(line) = lines.next_line().await? {
            let reply = self.dispatch(&line).await;
            if !reply.output.is_empty() {
                stdout.write_all(reply.output.as_bytes()).await?;
                stdout.write_all(b"\n").await?;
            }
            if reply.quit {
                break;
            }

            // A pending notice blocks until acknowledged with Enter
            if let Some(notice) = self.session.dashboard_mut().and_then(|d| d.take_notice()) {
                stdout
                    .write_all(format!("*** {notice} ***\n[press Enter to continue] ").as_bytes())
                    .await?;
                stdout.flush().await?;
                let _ = lines.next_line().await?;
            }

            stdout.write_all(b"> ").await?;
            stdout.flush().await?;
        }

        Ok(())
    }
}

fn role_list() -> String {
    Role::ALL
        .iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_app() -> App {
        App::new(DataSource::Catalog(ProductCatalog::demo()))
    }

    #[tokio::test]
    async fn test_login_then_search_sample() {
        let mut app = demo_app();
        app.dispatch("login user").await;
        assert_eq!(app.session().role(), Some(Role::User));

        let reply = app.dispatch("search prod123").await;
        assert!(reply.output.contains("Organic Tomatoes"));
        assert!(!app.session().dashboard().unwrap().has_notice());
    }

    #[tokio::test]
    async fn test_search_unknown_id_raises_notice() {
        let mut app = demo_app();
        app.dispatch("farmer").await;
        app.dispatch("search PROD999").await;

        let dashboard = app.session().dashboard().unwrap();
        assert!(dashboard.tracker.product().is_none());
        assert!(dashboard.has_notice());
    }

    #[tokio::test]
    async fn test_add_panel_gated_by_role() {
        let mut app = demo_app();
        app.dispatch("login user").await;
        let reply = app.dispatch("add").await;
        assert!(reply.output.contains("requires a supply-chain role"));

        app.dispatch("logout").await;
        app.dispatch("login retailer").await;
        app.dispatch("add").await;
        assert_eq!(
            app.session().dashboard().unwrap().active_panel(),
            Panel::Add
        );
    }

    #[tokio::test]
    async fn test_submit_resets_form_and_notifies() {
        let mut app = demo_app();
        app.dispatch("login farmer").await;
        app.dispatch("add").await;
        app.dispatch("set name Organic Tomatoes").await;
        app.dispatch("set origin Green Valley").await;
        app.dispatch("set date 2024-02-15").await;
        app.dispatch("set details First harvest").await;
        app.dispatch("submit").await;

        let dashboard = app.session().dashboard().unwrap();
        assert_eq!(dashboard.form.name, "");
        assert_eq!(dashboard.form.origin, "");
        assert_eq!(dashboard.form.production_date, "");
        assert_eq!(dashboard.form.details, "");
        assert!(dashboard.has_notice());
    }

    #[tokio::test]
    async fn test_unknown_role_rejected_at_login() {
        let mut app = demo_app();
        let reply = app.dispatch("login auditor").await;
        assert!(reply.output.contains("Unknown role"));
        assert!(!app.session().is_authenticated());
    }
}
