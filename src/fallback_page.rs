//! Last-resort page echoing the description

/// Escape text for element content and quoted attribute values
pub fn escape_html(text: &str) -> String
{   let mut out = String::with_capacity(text.len());
    for c in text.chars()
    {   match c
        {   '&' => out.push_str("&amp;")
          , '<' => out.push_str("&lt;")
          , '>' => out.push_str("&gt;")
          , '"' => out.push_str("&quot;")
          , '\'' => out.push_str("&#39;")
          , _ => out.push(c)
        }
    }
    out
}

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Generated App</title>
    <style>
        body {
            font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
            max-width: 800px;
            margin: 0 auto;
            padding: 20px;
            background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
            color: #333;
        }
        .card {
            background: white;
            padding: 30px;
            border-radius: 10px;
            box-shadow: 0 10px 30px rgba(0,0,0,0.2);
        }
        h1 {
            color: #5a67d8;
            text-align: center;
            margin-bottom: 20px;
        }
        .section {
            background: #f7fafc;
            padding: 20px;
            margin: 10px 0;
            border-radius: 8px;
            border-left: 4px solid #5a67d8;
        }
        button {
            background: #5a67d8;
            color: white;
            border: none;
            padding: 12px 24px;
            border-radius: 6px;
            cursor: pointer;
            font-size: 16px;
            margin: 5px;
        }
        button:hover {
            background: #4c51bf;
        }
        input {
            width: 100%;
            padding: 10px;
            border: 2px solid #e2e8f0;
            border-radius: 6px;
            font-size: 16px;
            margin: 5px 0;
            box-sizing: border-box;
        }
    </style>
</head>
<body>
    <div class="card">
        <h1>Generated Web Application</h1>
        <div class="section">
            <h3>Description:</h3>
            <p id="description">"#;

const PAGE_TAIL: &str = r#"</p>
        </div>
        <div class="section">
            <h3>Interactive Elements:</h3>
            <button id="greet" type="button">Click Me</button>
            <input id="entry" type="text" placeholder="Enter some text...">
        </div>
    </div>

    <script>
        console.log('Generated app loaded successfully!');

        document.getElementById('greet').addEventListener('click', function() {
            alert('Hello! This is your generated app.');
        });
        document.getElementById('entry').addEventListener('input', function() {
            console.log('User input:', this.value);
        });
    </script>
</body>
</html>"#;

/// Build the fixed-structure page for `description`. Total for any input.
pub fn build(description: &str) -> String
{   let escaped = escape_html(description);
    let mut page = String::with_capacity(
      PAGE_HEAD.len() + escaped.len() + PAGE_TAIL.len()
    );
    page.push_str(PAGE_HEAD);
    page.push_str(&escaped);
    page.push_str(PAGE_TAIL);
    page
}
