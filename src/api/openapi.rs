//! OpenAPI document for the REST surface.

use utoipa::OpenApi;

use super::dto;
use super::handlers::{adoptions, cases, donations, emergency, messages, system, users};
use crate::domain;
use crate::error::{ErrorBody, ErrorResponse};
use crate::service::NotificationStatus;
use crate::service::case_service::CaseView;

/// Generated API description, served at `/api-docs/openapi.json` when the
/// `swagger-ui` feature is on.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "welfare-ledger",
        description = "Donations, adoptions and emergency triage for animal-welfare organizations."
    ),
    paths(
        system::health_handler,
        users::register,
        users::profile,
        users::set_blockchain_address,
        messages::inbox,
        messages::mark_read,
        cases::create_case,
        cases::list_cases,
        cases::get_case,
        cases::assign_doctor,
        cases::case_donations,
        cases::post_update,
        cases::published_updates,
        cases::all_updates,
        cases::set_published,
        cases::delete_update,
        adoptions::create_listing,
        adoptions::list_listings,
        adoptions::get_listing,
        adoptions::file_request,
        adoptions::list_requests,
        adoptions::get_request,
        adoptions::decide,
        adoptions::submit_payment_proof,
        adoptions::pay,
        adoptions::verify_payment,
        donations::donate,
        donations::process_donation,
        emergency::report,
        emergency::list,
        emergency::get_emergency,
        emergency::assign_doctor,
        emergency::diagnose,
        emergency::convert_to_case,
    ),
    components(schemas(
        ErrorResponse,
        ErrorBody,
        NotificationStatus,
        CaseView,
        system::HealthResponse,
        domain::UserId,
        domain::CaseId,
        domain::AdoptionId,
        domain::AdoptionRequestId,
        domain::CaseUpdateId,
        domain::DonationId,
        domain::EmergencyId,
        domain::MessageId,
        domain::Role,
        domain::UserAccount,
        domain::Message,
        domain::Case,
        domain::CaseStatus,
        domain::CostItem,
        domain::CaseUpdate,
        domain::UpdateKind,
        domain::Donation,
        domain::DonationStatus,
        domain::Adoption,
        domain::AdoptionStatus,
        domain::AdoptionRequest,
        domain::AdoptionRequestStatus,
        domain::PaymentRecord,
        domain::Emergency,
        domain::EmergencyStatus,
        domain::WalletAddress,
        domain::TxHash,
        dto::PaginationMeta,
        dto::NotificationFields,
        dto::RegisterUserRequest,
        dto::BlockchainAddressRequest,
        dto::CreateCaseRequest,
        dto::CaseListResponse,
        dto::AssignDoctorRequest,
        dto::CreateCaseUpdateRequest,
        dto::PublishUpdateRequest,
        dto::DeleteUpdateResponse,
        dto::CreateAdoptionRequest,
        dto::AdoptionListResponse,
        dto::FileAdoptionRequest,
        dto::Decision,
        dto::DecideRequest,
        dto::PaymentProofRequest,
        dto::PaymentRequest,
        dto::VerifyPaymentRequest,
        dto::AdoptionRequestResponse,
        dto::DonateRequest,
        dto::ProcessDonationRequest,
        dto::DonationResponse,
        dto::ReportEmergencyRequest,
        dto::EmergencyListResponse,
        dto::AssignEmergencyRequest,
        dto::DiagnosisRequest,
        dto::ConvertEmergencyRequest,
        dto::ConvertEmergencyResponse,
    )),
    tags(
        (name = "System", description = "Health"),
        (name = "Users", description = "Accounts and wallet addresses"),
        (name = "Messages", description = "In-app inbox"),
        (name = "Cases", description = "Fundraising cases"),
        (name = "Case updates", description = "Progress reports on cases"),
        (name = "Adoptions", description = "Adoption listings"),
        (name = "Adoption requests", description = "Adoption request workflow"),
        (name = "Donations", description = "On-chain donations"),
        (name = "Emergencies", description = "Emergency reports and triage"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_the_workflow_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health",
            "/api/v1/adoption-request/{id}/verify-payment",
            "/api/v1/donor/donate",
            "/api/v1/emergency/{id}/convert-to-case",
            "/api/v1/cases/{id}/updates",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
