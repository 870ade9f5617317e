//! Three-step listing upload: details, uploads, confirmation.

use crate::api::{Attachment, MarketApi, NewListing};
use crate::error::{MarketError, Result, ValidationErrors};
use crate::models::{Listing, ListingKind};
use crate::routes::Route;
use crate::session::TokenStore;
use crate::validate;
use std::fmt;
use std::path::Path;
use tracing::{debug, info, warn};

pub const MIN_IMAGES: usize = 4;
pub const MAX_IMAGES: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum WizardStep {
    #[default]
    Details,
    Uploads,
    Confirmation,
}

impl WizardStep {
    pub fn index(self) -> usize {
        self as usize
    }

    fn next(self) -> Self {
        match self {
            WizardStep::Details => WizardStep::Uploads,
            WizardStep::Uploads | WizardStep::Confirmation => WizardStep::Confirmation,
        }
    }

    fn previous(self) -> Self {
        match self {
            WizardStep::Details | WizardStep::Uploads => WizardStep::Details,
            WizardStep::Confirmation => WizardStep::Uploads,
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WizardStep::Details => write!(f, "details"),
            WizardStep::Uploads => write!(f, "uploads"),
            WizardStep::Confirmation => write!(f, "confirmation"),
        }
    }
}

/// Raw text of the details step, as typed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingDetails {
    pub farm_id: String,
    pub location: String,
    pub size: String,
    pub price: String,
    pub quality: String,
    pub email: String,
    pub phone: String,
    pub description: String,
    pub kind: ListingKind,
    pub rent_duration: String,
}

impl Default for ListingDetails {
    fn default() -> Self {
        Self {
            farm_id: String::new(),
            location: String::new(),
            size: String::new(),
            price: String::new(),
            quality: String::new(),
            email: String::new(),
            phone: String::new(),
            description: String::new(),
            kind: ListingKind::Sale,
            rent_duration: String::new(),
        }
    }
}

/// Parsed numbers from a details step that passed
struct CheckedNumbers {
    size: f64,
    price: f64,
}

fn check_details(details: &ListingDetails) -> Result<CheckedNumbers> {
    let mut errors = ValidationErrors::new();
    validate::require(&mut errors, "farm_id", &details.farm_id);
    validate::require(&mut errors, "location", &details.location);
    let size = validate::require_positive(&mut errors, "size", &details.size);
    let price = validate::require_positive(&mut errors, "price", &details.price);
    validate::require(&mut errors, "quality", &details.quality);
    validate::require_email(&mut errors, "email", &details.email);
    validate::require_phone(&mut errors, "phone", &details.phone);
    validate::require(&mut errors, "description", &details.description);
    if details.kind == ListingKind::Rent {
        validate::require(&mut errors, "rent_duration", &details.rent_duration);
    }
    errors.into_result()?;

    match (size, price) {
        (Some(size), Some(price)) => Ok(CheckedNumbers { size, price }),
        _ => Err(MarketError::invalid("details", "size and price are required")),
    }
}

/// Accept an image selection only if it holds 4 to 10 files
pub fn check_image_count(count: usize) -> Result<()> {
    if (MIN_IMAGES..=MAX_IMAGES).contains(&count) {
        Ok(())
    } else {
        Err(MarketError::invalid(
            "images",
            format!(
                "select between {} and {} images, got {}",
                MIN_IMAGES, MAX_IMAGES, count
            ),
        ))
    }
}

/// Form state of the upload wizard
#[derive(Debug, Clone, Default)]
pub struct UploadWizard {
    step: WizardStep,
    pub details: ListingDetails,
    images: Vec<Attachment>,
    document: Option<Attachment>,
}

impl UploadWizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn images(&self) -> &[Attachment] {
        &self.images
    }

    pub fn document(&self) -> Option<&Attachment> {
        self.document.as_ref()
    }

    /// Replace the image list. Out-of-range selections are discarded and
    /// the previous list is kept.
    pub fn select_images(&mut self, selection: Vec<Attachment>) -> Result<()> {
        if let Err(e) = check_image_count(selection.len()) {
            warn!("Rejected image selection of {} files", selection.len());
            return Err(e);
        }
        debug!("Accepted {} images", selection.len());
        self.images = selection;
        Ok(())
    }

    /// Read and select image files. The count is checked before any file
    /// is opened.
    pub async fn select_image_files<P: AsRef<Path>>(&mut self, paths: &[P]) -> Result<()> {
        if let Err(e) = check_image_count(paths.len()) {
            warn!("Rejected image selection of {} files", paths.len());
            return Err(e);
        }
        let mut selection = Vec::with_capacity(paths.len());
        for path in paths {
            let path = path.as_ref();
            let image = Attachment::from_path(path).await.map_err(|e| {
                MarketError::Storage(format!("read {}: {}", path.display(), e))
            })?;
            selection.push(image);
        }
        self.select_images(selection)
    }

    pub fn attach_document(&mut self, document: Option<Attachment>) {
        self.document = document;
    }

    /// Validate the current step and move forward
    pub fn next(&mut self) -> Result<WizardStep> {
        match self.step() {
            WizardStep::Details => {
                check_details(&self.details)?;
            }
            WizardStep::Uploads => check_image_count(self.images.len())?,
            WizardStep::Confirmation => {}
        }
        self.step = self.step.next();
        Ok(self.step)
    }

    /// Move back without re-validating anything
    pub fn back(&mut self) -> WizardStep {
        self.step = self.step.previous();
        self.step
    }

    fn build(&self) -> Result<NewListing> {
        let numbers = check_details(&self.details)?;
        check_image_count(self.images.len())?;

        let details = &self.details;
        Ok(NewListing {
            farm_id: details.farm_id.trim().to_string(),
            location: details.location.trim().to_string(),
            price: numbers.price,
            size: numbers.size,
            quality: details.quality.trim().to_string(),
            description: details.description.trim().to_string(),
            email: details.email.trim().to_string(),
            phone: details.phone.trim().to_string(),
            kind: details.kind,
            rent_duration: (details.kind == ListingKind::Rent)
                .then(|| details.rent_duration.trim().to_string()),
            images: self.images.clone(),
            document: self.document.clone(),
        })
    }

    /// Send everything as one multipart request. Requires a stored session
    /// and the confirmation step; lands on the seller home on success.
    pub async fn submit(&self, api: &dyn MarketApi, store: &dyn TokenStore) -> Result<(Listing, Route)> {
        let access = store.access_token()?.ok_or(MarketError::NotAuthenticated)?;
        if self.step() != WizardStep::Confirmation {
            return Err(MarketError::invalid(
                "step",
                format!("cannot submit from the {} step", self.step()),
            ));
        }

        let listing = self.build()?;
        let created = api.create_listing(&access, &listing).await?;
        info!("Listing {} uploaded as #{}", created.farm_id, created.id);
        Ok((created, Route::SellerHome))
    }
}
