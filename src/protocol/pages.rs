//! HTML pages
//!
//! The login/registration page and the file manager page. Both are static
//! documents whose scripts talk to the JSON endpoints.

pub const LOGIN_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8" />
<title>Login & Registration - RAX Drive</title>
<style>
body{font-family:sans-serif; background:#eef2f3; padding:20px;}
form{margin:20px auto; width:300px; padding:15px; background:#fff; border-radius:5px;}
input[type=text],input[type=password]{width:100%; padding:8px; margin:8px 0; box-sizing:border-box;}
button{width:100%; padding:10px; margin:8px 0; background:#2f6f2f; color:#fff; border:none; cursor:pointer; font-size:16px;}
button:hover{background:#245d24;}
#errorMsg{color:red; margin-bottom:10px; text-align:center;}
h2{color:#2f6f2f; text-align:center;}
</style>
</head>
<body>
<h2>Login</h2>
<div id="errorMsg"></div>
<form id="loginForm">
<input type="text" name="username" placeholder="Username" required />
<input type="password" name="password" placeholder="Password" required />
<button type="submit">Login</button>
</form>
<h2>Register</h2>
<form id="registerForm">
<input type="text" name="username" placeholder="Username" required />
<input type="password" name="password" placeholder="Password" required />
<button type="submit">Register</button>
</form>
<script>
const errorDiv = document.getElementById("errorMsg");

async function submitForm(form, url) {
    const body = new URLSearchParams(new FormData(form));
    const res = await fetch(url, {method: "POST", body: body});
    return res.json();
}

document.getElementById("loginForm").onsubmit = async function(e) {
    e.preventDefault();
    errorDiv.innerText = "";
    const data = await submitForm(e.target, "/api/login");
    if (data.success) {
        location.href = "/";
    } else {
        errorDiv.innerText = data.msg;
    }
};

document.getElementById("registerForm").onsubmit = async function(e) {
    e.preventDefault();
    errorDiv.innerText = "";
    const data = await submitForm(e.target, "/api/register");
    if (data.success) {
        alert("Registration successful, please login");
        e.target.reset();
    } else {
        errorDiv.innerText = data.msg;
    }
};
</script>
</body>
</html>
"#;

const FILE_MANAGER_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8" />
<title>RAX Drive</title>
<style>
body{font-family:sans-serif; background:#e0f0e0; margin:0; padding:0;}
#top{padding:10px; background:#2f6f2f; color:#fff;}
#fileList{padding:10px;}
.item{padding:5px; margin:3px 0; background:#fff; border-radius:3px; user-select:none;}
.item:hover{background:#dbf0db;}
.item .name{display:inline-block; width:60%;}
.item .actions{display:inline-block; width:35%; text-align:right;}
button{margin-left:5px;}
.dir{font-weight:bold; color:#2f6f2f;}
</style>
</head>
<body>
<div id="top">
    User: <span id="userName">{{USERNAME_HTML}}</span>
    <button onclick="logout()">Logout</button>
    <button onclick="goUp()">Up One Level</button>
    <button onclick="makeDirectory()">New Folder</button>
    <input type="file" id="fileUpload" />
    <button onclick="uploadFile()">Upload File</button>
    <span id="pathDisplay"></span>
</div>
<div id="fileList"></div>
<script>
const userName = {{USERNAME_JSON}};
let currentPath = "";

function joinPath(name) {
    return currentPath ? currentPath + "/" + name : name;
}

function encodePath(path) {
    return path.split("/").map(encodeURIComponent).join("/");
}

function postForm(url, fields) {
    return fetch(url, {method: "POST", body: new URLSearchParams(fields)})
        .then(r => r.json())
        .then(res => {
            if (res.success) loadFiles();
            else alert("Failed: " + res.msg);
        });
}

function logout() {
    fetch("/api/logout", {method: "POST"}).finally(() => {
        window.location.href = "/login";
    });
}

function goUp() {
    if (currentPath === "") return;
    const parts = currentPath.split("/");
    parts.pop();
    currentPath = parts.join("/");
    loadFiles();
}

function button(label, handler) {
    const b = document.createElement("button");
    b.innerText = label;
    b.onclick = handler;
    return b;
}

function loadFiles() {
    document.getElementById("pathDisplay").innerText = "Path: /" + currentPath;
    fetch("/files/" + encodeURIComponent(userName) + "/" + encodePath(currentPath))
        .then(r => r.json())
        .then(data => {
            if (!data.success) {
                alert("Failed to load files: " + data.msg);
                return;
            }
            const div = document.getElementById("fileList");
            div.innerHTML = "";
            data.files.forEach(item => {
                const row = document.createElement("div");
                row.className = "item";
                const name = document.createElement("span");
                name.className = item.isDir ? "name dir" : "name";
                name.innerText = item.name;
                const actions = document.createElement("span");
                actions.className = "actions";
                if (item.isDir) actions.appendChild(button("Open", () => openDirectory(item.name)));
                else actions.appendChild(button("Download", () => downloadFile(item.name)));
                actions.appendChild(button("Rename", () => renameItem(item.name)));
                actions.appendChild(button("Delete", () => deleteItem(item.name)));
                actions.appendChild(button("Move", () => moveItem(item.name)));
                row.appendChild(name);
                row.appendChild(actions);
                div.appendChild(row);
            });
        });
}

function openDirectory(name) {
    currentPath = joinPath(name);
    loadFiles();
}

function downloadFile(name) {
    window.open("/download/" + encodeURIComponent(userName) + "/" + encodePath(joinPath(name)), "_blank");
}

function renameItem(oldName) {
    const newName = prompt("New name", oldName);
    if (!newName || newName === oldName) return;
    postForm("/rename", {path: joinPath(oldName), newname: newName});
}

function deleteItem(name) {
    if (!confirm("Confirm delete " + name + "?")) return;
    postForm("/delete", {path: joinPath(name)});
}

function makeDirectory() {
    const name = prompt("New folder name");
    if (!name) return;
    postForm("/mkdir", {path: currentPath, name: name});
}

function moveItem(name) {
    const newPath = prompt("Destination folder (relative path, / for home)");
    if (newPath === null || newPath === "") return;
    postForm("/move", {path: joinPath(name), newpath: newPath});
}

function uploadFile() {
    const file = document.getElementById("fileUpload").files[0];
    if (!file) {
        alert("Please select a file");
        return;
    }
    const formData = new FormData();
    formData.append("file", file);
    fetch("/upload?path=" + encodeURIComponent(currentPath), {method: "POST", body: formData})
        .then(r => r.json())
        .then(res => {
            if (res.success) loadFiles();
            else alert("Failed: " + res.msg);
        });
}

window.onload = loadFiles;
</script>
</body>
</html>
"#;

/// File manager page for `username`
pub fn file_manager_page(username: &str) -> String {
    FILE_MANAGER_PAGE
        .replace("{{USERNAME_HTML}}", &html_escape::encode_text(username))
        .replace("{{USERNAME_JSON}}", &script_string(username))
}

/// JSON string literal that is also safe inside a `<script>` element
fn script_string(value: &str) -> String {
    serde_json::Value::String(value.to_string())
        .to_string()
        .replace('<', "\\u003c")
}
