//! Camera / file picker producing a [`PhotoUpload`].

use audit::photos::PhotoUpload;
use dioxus::prelude::*;

use crate::icons::FaCamera;
use crate::Icon;

/// File input limited to images. On mobile browsers `capture` opens the
/// rear camera directly. Emits `None` when the selection is cleared or
/// cannot be read.
#[component]
pub fn PhotoInput(
    label: String,
    on_change: EventHandler<Option<PhotoUpload>>,
    #[props(default)] disabled: bool,
) -> Element {
    let mut file_name = use_signal(|| Option::<String>::None);

    let onchange = move |evt: FormEvent| async move {
        let Some(file) = evt.files().into_iter().next() else {
            file_name.set(None);
            on_change.call(None);
            return;
        };
        let content_type = file
            .content_type()
            .unwrap_or_else(|| "image/jpeg".to_string());
        match file.read_bytes().await {
            Ok(bytes) => {
                file_name.set(Some(file.name()));
                on_change.call(Some(PhotoUpload::from_bytes(content_type, &bytes)));
            }
            Err(e) => {
                tracing::error!("Failed to read photo: {}", e);
                file_name.set(None);
                on_change.call(None);
            }
        }
    };

    rsx! {
        label {
            class: "photo-input",
            Icon { icon: FaCamera, width: 16, height: 16 }
            span { "{label}" }
            input {
                r#type: "file",
                accept: "image/*",
                capture: "environment",
                disabled: disabled,
                onchange: onchange,
            }
            if let Some(name) = file_name() {
                span { class: "photo-input-name", "{name}" }
            }
        }
    }
}
