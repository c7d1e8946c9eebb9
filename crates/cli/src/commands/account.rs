//! Customer account commands.

use avira_vastra_core::Email;
use avira_vastra_storefront::AppState;
use avira_vastra_storefront::models::{Credentials, GoogleSignIn, Registration, User};
use avira_vastra_storefront::services::account;
use clap::Subcommand;

use super::{CommandResult, say};

#[derive(Subcommand)]
pub enum AccountAction {
    /// Sign in with email and password
    Login {
        #[arg(short, long)]
        email: Email,

        #[arg(short, long)]
        password: String,
    },
    /// Sign in with a Google ID token
    Google {
        /// ID token issued by Google
        credential: String,
    },
    /// Create an account
    Register {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: Email,

        #[arg(short, long)]
        password: String,

        #[arg(long)]
        phone: Option<String>,
    },
    /// Sign out
    Logout,
    /// Show the signed-in profile, refreshed from the backend
    Profile,
}

pub async fn run(state: &AppState, action: AccountAction) -> CommandResult {
    let api = state.api();
    let session = state.session();

    match action {
        AccountAction::Login { email, password } => {
            let user = account::login(api, session, &Credentials {
                email: email.into_inner(),
                password,
            }).await?;
            say!("Signed in as {}", user.name);
        }
        AccountAction::Google { credential } => {
            let user = account::google_login(api, session, &GoogleSignIn { credential }).await?;
            say!("Signed in as {}", user.name);
        }
        AccountAction::Register {
            name,
            email,
            password,
            phone,
        } => {
            let registration = Registration {
                name,
                email: email.into_inner(),
                password,
                phone,
            };
            let user = account::register(api, session, &registration).await?;
            say!("Welcome, {}", user.name);
        }
        AccountAction::Logout => {
            session.logout();
            say!("Signed out");
        }
        AccountAction::Profile => {
            if !session.is_authenticated() {
                say!("Not signed in");
                return Ok(());
            }
            let user = account::refresh_profile(api, session).await?;
            print_profile(&user)?;
        }
    }
    Ok(())
}

fn print_profile(user: &User) -> CommandResult {
    say!("{} <{}>", user.name, user.email);
    if let Some(phone) = &user.phone {
        say!("  phone:   {phone}");
    }
    if let Some(address) = &user.address {
        say!(
            "  address: {}, {}, {} {}",
            address.street,
            address.city,
            address.state,
            address.pincode
        );
    }
    Ok(())
}
