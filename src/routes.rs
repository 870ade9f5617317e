use std::fmt;
use std::str::FromStr;

/// Which login a route sits behind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Area {
    Public,
    User,
    Admin,
}

/// Client-side navigation targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    AdminLogin,
    Home,
    Buy,
    Rent,
    Listing(i64),
    SellerHome,
    SellerUpload,
    SellerListings,
    SellerTransactions,
    AdminHome,
}

impl Route {
    pub fn is_login(&self) -> bool {
        matches!(self, Route::Login | Route::AdminLogin)
    }

    pub fn area(&self) -> Area {
        match self {
            Route::Buy | Route::Rent | Route::Listing(_) => Area::Public,
            Route::AdminLogin | Route::AdminHome => Area::Admin,
            _ => Area::User,
        }
    }

    pub fn requires_session(&self) -> bool {
        self.area() != Area::Public
    }

    /// Login view guarding this route
    pub fn login_route(&self) -> Route {
        match self.area() {
            Area::Admin => Route::AdminLogin,
            _ => Route::Login,
        }
    }

    /// Where an authenticated visitor of this route's area lands
    pub fn landing_route(&self) -> Route {
        match self.area() {
            Area::Admin => Route::AdminHome,
            _ => Route::Home,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".into(),
            Route::AdminLogin => "/admin/login".into(),
            Route::Home => "/".into(),
            Route::Buy => "/buy".into(),
            Route::Rent => "/rent".into(),
            Route::Listing(id) => format!("/farms/{}", id),
            Route::SellerHome => "/seller".into(),
            Route::SellerUpload => "/seller/upload".into(),
            Route::SellerListings => "/seller/listings".into(),
            Route::SellerTransactions => "/seller/transactions".into(),
            Route::AdminHome => "/admin".into(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRoute(pub String);

impl fmt::Display for UnknownRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown route: {}", self.0)
    }
}

impl std::error::Error for UnknownRoute {}

impl FromStr for Route {
    type Err = UnknownRoute;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let path = s.split(|c| c == '?' || c == '#').next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        let route = match trimmed {
            "" => Route::Home,
            "/login" => Route::Login,
            "/admin/login" => Route::AdminLogin,
            "/buy" => Route::Buy,
            "/rent" => Route::Rent,
            "/seller" => Route::SellerHome,
            "/seller/upload" => Route::SellerUpload,
            "/seller/listings" => Route::SellerListings,
            "/seller/transactions" => Route::SellerTransactions,
            "/admin" => Route::AdminHome,
            other => {
                let id = other
                    .strip_prefix("/farms/")
                    .and_then(|id| id.parse::<i64>().ok())
                    .ok_or_else(|| UnknownRoute(s.to_string()))?;
                Route::Listing(id)
            }
        };
        Ok(route)
    }
}
