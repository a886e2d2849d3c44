//! Single-page chat widget served at `/`.

use crate::dto::PageInfo;

const STYLE: &str = r#"
  :root { color-scheme: dark; }
  * { box-sizing: border-box; }
  body { margin: 0; font-family: system-ui, sans-serif; background: #2d3748; color: #f7fafc; }
  main { max-width: 760px; margin: 0 auto; padding: 24px 16px; display: flex; flex-direction: column; height: 100vh; }
  h1 { margin: 0 0 4px; font-size: 1.5rem; }
  p.description { margin: 0 0 16px; color: #cbd5e0; }
  #log { flex: 1; overflow-y: auto; display: flex; flex-direction: column; gap: 10px; padding: 12px; background: #4a5568; border-radius: 8px; }
  .turn { max-width: 85%; padding: 10px 14px; border-radius: 8px; white-space: pre-wrap; line-height: 1.4; }
  .user { align-self: flex-end; background: #718096; }
  .assistant { align-self: flex-start; background: #2d3748; }
  .error { align-self: center; color: #feb2b2; font-size: 0.9rem; }
  form { display: flex; gap: 8px; margin-top: 12px; }
  input { flex: 1; padding: 10px; border-radius: 6px; border: 1px solid #718096; background: #4a5568; color: #f7fafc; }
  button { padding: 10px 16px; border-radius: 6px; border: 0; background: #718096; color: #f7fafc; cursor: pointer; }
  button:disabled { opacity: 0.5; cursor: default; }
"#;

const SCRIPT: &str = r#"
  const log = document.getElementById("log");
  const form = document.getElementById("composer");
  const input = document.getElementById("message");
  const send = document.getElementById("send");
  const history = [{ role: "assistant", content: OPENING }];

  function show(kind, text) {
    const div = document.createElement("div");
    div.className = "turn " + kind;
    div.textContent = text;
    log.appendChild(div);
    log.scrollTop = log.scrollHeight;
  }

  show("assistant", OPENING);

  form.addEventListener("submit", async (event) => {
    event.preventDefault();
    const message = input.value.trim();
    if (!message) return;
    input.value = "";
    send.disabled = true;
    show("user", message);
    try {
      const response = await fetch("/api/chat", {
        method: "POST",
        headers: { "Content-Type": "application/json" },
        body: JSON.stringify({ message, history }),
      });
      const body = await response.json();
      if (!response.ok) throw new Error(body.error || response.statusText);
      history.push({ role: "user", content: message });
      history.push({ role: "assistant", content: body.reply });
      show("assistant", body.reply);
    } catch (err) {
      show("error", err.message);
    } finally {
      send.disabled = false;
      input.focus();
    }
  });
"#;

pub(crate) fn render_page(page: &PageInfo) -> String {
    let title = escape_html(&page.title);
    let description = escape_html(&page.description);
    let opening = script_json(&page.opening_message);

    format!(
        r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>{STYLE}</style>
</head>
<body>
<main>
  <h1>{title}</h1>
  <p class="description">{description}</p>
  <div id="log" aria-live="polite"></div>
  <form id="composer">
    <input id="message" autocomplete="off" placeholder="Type your message..." autofocus>
    <button id="send" type="submit">Send</button>
  </form>
</main>
<script>
  const OPENING = {opening};
{SCRIPT}
</script>
</body>
</html>
"#
    )
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// JSON string literal that is safe inside a `<script>` element.
fn script_json(text: &str) -> String {
    serde_json::Value::String(text.to_string())
        .to_string()
        .replace("</", "<\\/")
}
