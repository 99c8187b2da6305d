//! Line-oriented command handling for the interactive shell.

use clap::{Parser, Subcommand};
use shala_core::auth::AuthError;
use shala_core::models::User;
use shala_core::AuthStore;
use tracing::debug;

#[derive(Debug, Parser)]
#[command(no_binary_name = true, disable_version_flag = true, name = "shala")]
struct Line {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Log in; the password is prompted for
    Login { email: String },
    /// Create an account; the password is prompted for
    Signup { email: String },
    /// Show the authenticated user
    Me,
    /// End the session
    Logout,
    /// Confirm an email address with the token from the verification link
    VerifyEmail { token: String },
    /// Send the verification email again
    ResendVerification,
    /// Request a password reset link
    ForgotPassword { email: String },
    /// Set a new password with the token from the reset link
    ResetPassword { token: String },
    /// Show local session state
    Status,
    /// Leave the shell
    #[command(alias = "exit")]
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Quit,
}

pub struct Shell {
    store: AuthStore,
}

impl Shell {
    pub fn new(store: AuthStore) -> Self {
        Self { store }
    }

    pub async fn bootstrap(&self) {
        match self.store.bootstrap().await {
            Some(user) => println!("Welcome back, {}.", user.display_name()),
            None => println!("Not logged in."),
        }
    }

    pub async fn execute(&self, line: &str) -> Outcome {
        let words: Vec<&str> = line.split_whitespace().collect();
        if words.is_empty() {
            return Outcome::Continue;
        }

        let command = match Line::try_parse_from(words) {
            Ok(parsed) => parsed.command,
            Err(e) => {
                // clap renders help and usage errors itself
                let _ = e.print();
                return Outcome::Continue;
            }
        };
        debug!(?command, "Executing shell command");

        match command {
            Command::Quit => return Outcome::Quit,
            Command::Status => self.print_status(),
            Command::Login { email } => {
                if let Some(password) = prompt_password("Password: ") {
                    report_user(self.store.login(&email, &password).await, "Logged in as");
                }
            }
            Command::Signup { email } => {
                if let Some(password) = prompt_password("Choose a password: ") {
                    report_user(self.store.signup(&email, &password).await, "Account created for");
                }
            }
            Command::Me => match self.store.refresh_user().await {
                Ok(user) => print_user(&user),
                Err(e) if e.is_forbidden() => {
                    println!("Your email is not verified yet. Run `resend-verification`.");
                }
                Err(e) => report_error(&AuthError::Api(e)),
            },
            Command::Logout => {
                self.store.logout().await;
                println!("Logged out.");
            }
            Command::VerifyEmail { token } => match self.store.verify_email(&token).await {
                Ok(response) => println!("{}", response.message),
                Err(e) => report_error(&e),
            },
            Command::ResendVerification => match self.store.resend_verification().await {
                Ok(response) => println!("{}", response.message),
                Err(e) => report_error(&e),
            },
            Command::ForgotPassword { email } => match self.store.forgot_password(&email).await {
                Ok(_) => println!("If that account exists, a reset link is on its way."),
                Err(e) => report_error(&e),
            },
            Command::ResetPassword { token } => {
                if let Some(password) = prompt_password("New password: ") {
                    match self.store.reset_password(&token, &password).await {
                        Ok(_) => println!("Password updated. You can log in now."),
                        Err(e) => report_error(&e),
                    }
                }
            }
        }

        Outcome::Continue
    }

    fn print_status(&self) {
        let state = self.store.state();
        match state.user {
            Some(ref user) => println!(
                "Logged in as {} ({}), token {}",
                user.email,
                user.role.display(),
                if self.store.api().credential().is_set() { "held" } else { "missing" },
            ),
            None if state.loading => println!("Session not checked yet."),
            None => println!("Not logged in."),
        }
    }
}

fn prompt_password(prompt: &str) -> Option<String> {
    match rpassword::prompt_password(prompt) {
        Ok(password) => Some(password),
        Err(e) => {
            eprintln!("Could not read password: {}", e);
            None
        }
    }
}

fn report_user(result: Result<User, AuthError>, prefix: &str) {
    match result {
        Ok(user) => {
            println!("{} {}.", prefix, user.display_name());
            if !user.is_email_verified {
                println!("Check your inbox to verify your email address.");
            }
        }
        Err(e) => report_error(&e),
    }
}

fn report_error(error: &AuthError) {
    match error {
        AuthError::Validation(v) => eprintln!("{}: {}", v.field, v.message),
        AuthError::Api(e) => eprintln!("{}", e),
    }
}

fn print_user(user: &User) {
    println!("{}", user.display_name());
    println!("  id:       {}", user.id);
    println!("  email:    {}", user.email);
    println!("  role:     {}", user.role.display());
    println!(
        "  verified: {}",
        if user.is_email_verified { "yes" } else { "no" }
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        let parsed = Line::try_parse_from(["login", "asha@example.com"]).unwrap();
        assert!(matches!(parsed.command, Command::Login { ref email } if email == "asha@example.com"));

        let parsed = Line::try_parse_from(["verify-email", "tok"]).unwrap();
        assert!(matches!(parsed.command, Command::VerifyEmail { ref token } if token == "tok"));

        let parsed = Line::try_parse_from(["exit"]).unwrap();
        assert!(matches!(parsed.command, Command::Quit));
    }

    #[test]
    fn test_rejects_missing_arguments() {
        assert!(Line::try_parse_from(["login"]).is_err());
        assert!(Line::try_parse_from(["fly"]).is_err());
    }
}
