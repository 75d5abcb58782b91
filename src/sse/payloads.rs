//! Wire payloads for assistant stream events
//!
//! Internal deserialization structs; only the fields the reconciler needs.

use serde::Deserialize;

use super::events::Usage;

#[derive(Debug, Deserialize)]
pub(crate) struct MessageDeltaPayload {
    pub delta: MessageDelta,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MessageDelta {
    #[serde(default)]
    pub content: Vec<ContentDelta>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum ContentDelta {
    Text {
        #[serde(default)]
        text: Option<TextDelta>,
    },
    ImageFile {
        #[serde(default)]
        image_file: Option<FileRef>,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TextDelta {
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub annotations: Vec<AnnotationPayload>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AnnotationPayload {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub file_path: Option<FileRef>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FileRef {
    pub file_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RunStepDeltaPayload {
    pub delta: RunStepDelta,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RunStepDelta {
    #[serde(default)]
    pub step_details: Option<StepDetails>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StepDetails {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub tool_calls: Vec<ToolCallDelta>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ToolCallDelta {
    /// Present only on the first delta of a call
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub code_interpreter: Option<CodeInterpreterDelta>,
    #[serde(default)]
    pub function: Option<FunctionDelta>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CodeInterpreterDelta {
    #[serde(default)]
    pub input: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FunctionDelta {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub arguments: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RunPayload {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub required_action: Option<RequiredAction>,
    #[serde(default)]
    pub usage: Option<Usage>,
    #[serde(default)]
    pub last_error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RequiredAction {
    #[serde(default)]
    pub submit_tool_outputs: Option<SubmitToolOutputs>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitToolOutputs {
    #[serde(default)]
    pub tool_calls: Vec<RequiredToolCall>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RequiredToolCall {
    pub id: String,
    pub function: FunctionCall,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub arguments: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEventPayload {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<ErrorBody>,
}
