const TOPIC_PLACEHOLDER: &str = "{topic}";

const WEB_PROJECT_REQUEST: &str = r#"Generate a complete web project made of the files below. It is VERY IMPORTANT that you generate ALL the files using EXACTLY the format shown.

**REQUIRED FILES:**

1. **index.html** - Main HTML5 page
2. **css/styles.css** - CSS stylesheet
3. **js/script.js** - JavaScript code

**REQUIRED FORMAT for each file:**

For HTML:
```html:index.html
<!DOCTYPE html>
<html>
...full markup here...
</html>
```

For CSS:
```css:css/styles.css
/* Full styles here */
body { ... }
```

For JavaScript:
```js:js/script.js
// Full JavaScript code here
console.log('...');
```

**IMPORTANT:**
- ALWAYS generate the 3 complete files
- Do NOT use base64 assets (they are too large)
- Build the design with CSS and JavaScript only
- The code must be functional and modern
- Include explanatory comments

**PROJECT TOPIC:** {topic}

Now generate the 3 complete files following EXACTLY the format above."#;

/// Builds a request that asks a model for `index.html`, `css/styles.css` and
/// `js/script.js` fenced as ```` ```lang:path ````, the layout [`crate::extract`] reads.
pub fn web_project_request(topic: &str) -> String {
    WEB_PROJECT_REQUEST.replace(TOPIC_PLACEHOLDER, topic)
}
