//! CLI runner - executes commands

use crate::accounts::{Account, AccountManager, InMemoryTokenStore};
use crate::api::{self, rest, PullRequestListLoader, PullRequestSearchQuery};
use crate::auth::{Authenticator, Credentials};
use crate::cli::commands::{AccountCommand, Cli, Commands, OutputFormat};
use crate::config::Settings;
use crate::error::{Error, Result, ResultExt};
use crate::http::RequestExecutor;
use crate::model::{Repository, User};
use crate::pagination::{PagedRequest, PagesLoader, RequestPagination};
use crate::types::{RepositoryCoordinates, RepositoryPath, ServerPath};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Resolved server and executor for API commands
struct Context {
    server: ServerPath,
    executor: RequestExecutor,
    page_size: u32,
}

impl Context {
    fn page(&self) -> RequestPagination {
        RequestPagination::with_page_size(self.page_size)
    }

    fn pagination(&self) -> Option<RequestPagination> {
        Some(self.page())
    }
}

/// CLI runner
pub struct Runner {
    cli: Cli,
    cancel: CancellationToken,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self {
            cli,
            cancel: CancellationToken::new(),
        }
    }

    /// Cancelling this token aborts requests in flight
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let settings = Settings::load_or_default(self.cli.settings.as_deref())?;
        let accounts = self
            .account_manager(&settings)
            .await
            .context("Failed to open accounts")?;

        if let Commands::Accounts { command } = &self.cli.command {
            return self.accounts(&settings, &accounts, command).await;
        }

        let context = self.context(&settings, &accounts).await?;
        match &self.cli.command {
            Commands::Whoami => {
                let user: User = context
                    .executor
                    .execute_json(&rest::current_user(&context.server))
                    .await?;
                self.emit(&user);
                Ok(())
            }
            Commands::Repos { org } => {
                let request = match org {
                    Some(org) => rest::org_repos(&context.server, org, context.pagination()),
                    None => rest::user_repos(&context.server, context.pagination()),
                };
                self.emit_pages(&context, &request).await
            }
            Commands::Repo { repo } => {
                let coordinates = self.coordinates(&context.server, repo)?;
                let request = rest::repository(&coordinates.server, &coordinates.path);
                let repository: Option<Repository> =
                    context.executor.execute_optional(&request).await?;
                let repository = repository.ok_or_else(|| {
                    Error::http_status(404, format!("Repository {coordinates} not found"))
                })?;
                self.emit(&repository);
                Ok(())
            }
            Commands::Branches { repo } => {
                let coordinates = self.coordinates(&context.server, repo)?;
                let request =
                    rest::branches(&coordinates.server, &coordinates.path, context.pagination());
                self.emit_pages(&context, &request).await
            }
            Commands::Issues {
                repo,
                closed,
                max,
                assignee,
            } => {
                let coordinates = self.coordinates(&context.server, repo)?;
                let issues = api::load_issues(
                    &context.executor,
                    &coordinates.server,
                    &coordinates.path,
                    *closed,
                    *max,
                    assignee.as_deref(),
                    context.page(),
                )
                .await?;
                self.emit_all(&issues);
                Ok(())
            }
            Commands::SearchIssues {
                repo,
                query,
                closed,
                assignee,
            } => {
                let coordinates = self.coordinates(&context.server, repo)?;
                let issues = api::search_issues(
                    &context.executor,
                    &coordinates.server,
                    &coordinates.path,
                    *closed,
                    assignee.as_deref(),
                    query.as_deref(),
                    context.page(),
                )
                .await?;
                self.emit_all(&issues);
                Ok(())
            }
            Commands::Pulls { repo, query, pages } => {
                let coordinates = self.coordinates(&context.server, repo)?;
                let loader = PullRequestListLoader::new(
                    context.executor.clone(),
                    coordinates,
                    PullRequestSearchQuery::parse(query),
                );
                for _ in 0..*pages {
                    if !loader.can_load_more().await {
                        break;
                    }
                    loader.load_more().await?;
                }
                self.emit_all(&loader.items().await);
                Ok(())
            }
            Commands::Timeline { repo, number } => {
                let coordinates = self.coordinates(&context.server, repo)?;
                let items =
                    api::load_timeline(context.executor.clone(), &coordinates, *number).await?;
                self.emit_all(&items);
                Ok(())
            }
            // handled above
            Commands::Accounts { .. } => Ok(()),
        }
    }

    // ------------------------------------------------------------------------
    // Accounts
    // ------------------------------------------------------------------------

    async fn account_manager(&self, settings: &Settings) -> Result<AccountManager> {
        let tokens = Arc::new(InMemoryTokenStore::new());
        match self
            .cli
            .accounts_file
            .as_ref()
            .or(settings.accounts_file.as_ref())
        {
            Some(path) => AccountManager::from_file(path, tokens).await,
            None => Ok(AccountManager::new(std::path::PathBuf::new(), tokens)),
        }
    }

    async fn find_account(&self, accounts: &AccountManager, name: &str) -> Result<Account> {
        accounts
            .find_by_name(name)
            .await
            .ok_or_else(|| Error::AccountNotFound {
                name: name.to_string(),
            })
    }

    async fn accounts(
        &self,
        settings: &Settings,
        accounts: &AccountManager,
        command: &AccountCommand,
    ) -> Result<()> {
        match command {
            AccountCommand::List => {
                let default = accounts.default_account().await.map(|a| a.id);
                for account in accounts.accounts().await {
                    self.emit(&json!({
                        "id": account.id,
                        "name": account.name,
                        "server": account.server.to_string(),
                        "default": default == Some(account.id),
                    }));
                }
                Ok(())
            }
            AccountCommand::Add { name } => {
                let token = self
                    .cli
                    .token
                    .clone()
                    .ok_or_else(|| Error::missing_field("--token"))?;
                let server = self.server(settings, None)?;
                let account = Account::new(name.clone(), server);
                accounts.add_account(account.clone(), token).await?;
                self.emit(&account);
                Ok(())
            }
            AccountCommand::Remove { name } => {
                let account = self.find_account(accounts, name).await?;
                accounts.remove_account(&account.id).await?;
                Ok(())
            }
            AccountCommand::Default { name } => {
                let account = self.find_account(accounts, name).await?;
                accounts.set_default(Some(&account.id)).await
            }
        }
    }

    // ------------------------------------------------------------------------
    // Resolution
    // ------------------------------------------------------------------------

    /// `--server`, else the account's server, else the settings' server
    fn server(&self, settings: &Settings, account: Option<&Account>) -> Result<ServerPath> {
        match &self.cli.server {
            Some(server) => server.parse(),
            None => Ok(account.map_or_else(|| settings.server.clone(), |a| a.server.clone())),
        }
    }

    async fn context(&self, settings: &Settings, accounts: &AccountManager) -> Result<Context> {
        let account = match &self.cli.account {
            Some(name) => Some(self.find_account(accounts, name).await?),
            None => accounts.default_account().await,
        };
        let server = self.server(settings, account.as_ref())?;
        let config = settings.to_executor_config();

        let executor = match (&self.cli.token, &account) {
            (Some(token), _) => {
                RequestExecutor::new(config, Credentials::for_forge(server.forge(), token.clone()))?
            }
            (None, Some(account)) => accounts.executor_for(account, config).await?,
            (None, None) => {
                let authenticator = Authenticator::for_forge(server.forge());
                RequestExecutor::with_authenticator(config, authenticator)?
            }
        };
        debug!(
            "Using server {server} as {}",
            account.as_ref().map_or("anonymous", |a| a.name.as_str())
        );

        Ok(Context {
            server,
            executor: executor.with_cancellation(self.cancel.clone()),
            page_size: settings.page_size,
        })
    }

    /// `owner/name` on the selected server, or a git remote URL
    fn coordinates(&self, server: &ServerPath, repo: &str) -> Result<RepositoryCoordinates> {
        match repo.parse::<RepositoryPath>() {
            Ok(path) => Ok(RepositoryCoordinates::new(server.clone(), path)),
            Err(e) => RepositoryCoordinates::from_remote_url(repo).ok_or(e),
        }
    }

    // ------------------------------------------------------------------------
    // Output
    // ------------------------------------------------------------------------

    /// Stream every page's items to the output as they arrive
    async fn emit_pages<T>(&self, context: &Context, request: &PagedRequest<T>) -> Result<()>
    where
        T: DeserializeOwned + Serialize + Send,
    {
        PagesLoader::new(&context.executor)
            .load_all_with(request, |items| self.emit_all(&items))
            .await
    }

    fn emit_all<T: Serialize>(&self, items: &[T]) {
        for item in items {
            self.emit(item);
        }
    }

    /// Output one value
    fn emit<T: Serialize>(&self, value: &T) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(value).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;

    fn runner(args: &[&str]) -> Runner {
        let mut argv = vec!["prforge"];
        argv.extend_from_slice(args);
        Runner::new(Cli::try_parse_from(argv).unwrap())
    }

    #[test]
    fn test_coordinates_from_path_and_remote() {
        let cli = runner(&["whoami"]);
        let server = ServerPath::gitee();

        let local = cli.coordinates(&server, "o/r").unwrap();
        assert_eq!(local.server, server);
        assert_eq!(local.path, RepositoryPath::new("o", "r"));

        let remote = cli
            .coordinates(&server, "git@github.com:o/r.git")
            .unwrap();
        assert_eq!(remote.server, ServerPath::github());

        assert!(matches!(
            cli.coordinates(&server, "nonsense"),
            Err(Error::InvalidRepository { .. })
        ));
    }

    #[test]
    fn test_server_resolution() {
        let settings = Settings::default();
        let account = Account::new("alice", ServerPath::github());

        let plain = runner(&["whoami"]);
        assert_eq!(plain.server(&settings, None).unwrap(), ServerPath::gitee());
        assert_eq!(
            plain.server(&settings, Some(&account)).unwrap(),
            ServerPath::github()
        );

        let overridden = runner(&["whoami", "--server", "http://git.local:8080"]);
        let server = overridden.server(&settings, Some(&account)).unwrap();
        assert!(server.use_http);
        assert_eq!(server.port, Some(8080));
    }

    #[tokio::test]
    async fn test_accounts_commands() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("accounts.json");
        let file = file.to_str().unwrap();

        runner(&["accounts", "add", "alice", "--token", "t", "--accounts-file", file])
            .run()
            .await
            .unwrap();
        runner(&[
            "accounts", "add", "bob", "--token", "t", "--server", "github.com",
            "--accounts-file", file,
        ])
        .run()
        .await
        .unwrap();
        runner(&["accounts", "default", "bob", "--accounts-file", file])
            .run()
            .await
            .unwrap();

        let settings = Settings::default();
        let manager = runner(&["accounts", "list", "--accounts-file", file])
            .account_manager(&settings)
            .await
            .unwrap();
        let default = manager.default_account().await.unwrap();
        assert_eq!(default.name, "bob");
        assert_eq!(default.server, ServerPath::github());

        let missing = runner(&["accounts", "add", "carol", "--accounts-file", file])
            .run()
            .await;
        assert!(matches!(missing, Err(Error::MissingConfigField { .. })));
    }

    #[tokio::test]
    async fn test_stored_account_without_token() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("accounts.json");
        let file = file.to_str().unwrap();

        runner(&["accounts", "add", "alice", "--token", "t", "--accounts-file", file])
            .run()
            .await
            .unwrap();

        // Tokens are not persisted, a new process has none for alice
        let error = runner(&["whoami", "--accounts-file", file])
            .run()
            .await
            .unwrap_err();
        assert!(error.is_auth_failure());
    }
}
