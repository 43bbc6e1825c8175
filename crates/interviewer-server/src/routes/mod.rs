//! API routes.

pub mod health;
pub mod interviews;
pub mod uploads;

pub use health::{HealthResponse, health_routes};
pub use interviews::{
    CreateInterviewRequest, CreateInterviewResponse, InterviewResponse, UploadsResponse,
    create_interview_handler, delete_interview_handler, get_interview_handler,
    list_uploads_handler,
};
pub use uploads::{UploadResponse, recording_file_name, upload_recording_handler};
