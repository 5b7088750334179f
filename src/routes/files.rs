use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};

use crate::AppState;
use crate::error::AppResult;

pub async fn download(
    State(state): State<AppState>,
    Path(file): Path<String>,
) -> AppResult<Response> {
    let path = state.pipeline.store().artifact_path(&file)?;
    let bytes = tokio::fs::read(&path).await?;

    Ok((
        [
            (header::CONTENT_TYPE, content_type(&file).to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file.replace('"', "")),
            ),
        ],
        bytes,
    )
        .into_response())
}

fn content_type(file: &str) -> &'static str {
    if file.ends_with(".pdf") {
        "application/pdf"
    } else {
        "text/plain; charset=utf-8"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_by_extension() {
        assert_eq!(content_type("Vivo_battlecard.pdf"), "application/pdf");
        assert_eq!(content_type("Vivo_battlecard.txt"), "text/plain; charset=utf-8");
    }
}
