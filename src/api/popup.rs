//! Popup page returned by the callback; posts the outcome to the opener and closes itself.

// crates.io
use serde_json::json;
// self
use crate::flows::HandshakeOutcome;

/// Renders the popup script for `outcome`.
///
/// The payload is embedded as a JSON literal with every `<` escaped, so token text can never
/// terminate the script element.
pub fn render(outcome: &HandshakeOutcome) -> String {
	let message = match outcome {
		HandshakeOutcome::Success { user_id } => json!({ "success": true, "userId": user_id }),
		HandshakeOutcome::Failure { error } => json!({ "success": false, "error": error }),
	};
	let message = message.to_string().replace('<', "\\u003c");

	format!(
		"<script>\n\
		 \tif (window.opener) {{\n\
		 \t\twindow.opener.postMessage({message}, \"*\");\n\
		 \t}}\n\
		 \twindow.close();\n\
		 </script>\n"
	)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{auth::UserId, flows::HANDSHAKE_FAILED};

	#[test]
	fn success_posts_user_id() {
		let user_id = UserId::new("abc.def.ghi").expect("User fixture should be valid.");
		let page = render(&HandshakeOutcome::Success { user_id });

		assert!(page.contains("{\"success\":true,\"userId\":\"abc.def.ghi\"}"));
		assert!(page.contains("\"*\""));
		assert!(page.contains("window.close()"));
	}

	#[test]
	fn failure_posts_generic_error() {
		let page = render(&HandshakeOutcome::Failure { error: HANDSHAKE_FAILED });

		assert!(page.contains("\"success\":false"));
		assert!(page.contains("\"error\":\"Authentication failed.\""));
	}

	#[test]
	fn payload_cannot_close_the_script() {
		let user_id = UserId::new("</script><b>").expect("User fixture should be valid.");
		let page = render(&HandshakeOutcome::Success { user_id });

		assert_eq!(page.matches("</script>").count(), 1);
		assert!(page.contains("\\u003c/script>"));
	}
}
