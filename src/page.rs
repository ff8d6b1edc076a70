pub const INDEX_HTML: &str = r##"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>California House Price Predictor</title>
    <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css" crossorigin="" />
    <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js" crossorigin=""></script>
    <style>
      html, body { margin: 0; padding: 0; min-height: 100%; background: #faffca; font-family: "Segoe UI", sans-serif; }
      #layout { display: flex; min-height: 100vh; }
      #panel { flex: 1; max-width: 500px; margin: 2rem; background: #b9d4aa; border-radius: 16px; padding: 2rem; }
      #side { flex: 2; margin: 2rem; border-radius: 16px; overflow: hidden; background: #b9d4aa; display: flex; flex-direction: column; align-items: center; }
      h1 { color: #5a827e; text-align: center; }
      .blurb { color: #84ae92; text-align: center; font-weight: 500; }
      form { display: flex; flex-direction: column; gap: 1rem; }
      .row { display: flex; align-items: center; gap: 12px; }
      .row label, .label { color: #5a827e; font-weight: 600; min-width: 140px; }
      .row input[type="range"] { flex: 1; }
      .row input[type="number"] { width: 90px; border-radius: 8px; border: 1px solid #84ae92; padding: 0.3rem 0.5rem; }
      select { width: 100%; padding: 0.5rem; border-radius: 8px; border: 1px solid #84ae92; }
      button { background: #5a827e; color: #fff; padding: 0.75rem; border: none; border-radius: 8px; font-weight: 700; font-size: 1rem; cursor: pointer; }
      button.secondary { background: #84ae92; }
      #result { display: none; padding: 1rem; border-radius: 8px; text-align: center; }
      #result.price { display: block; background: #84ae92; color: #fff; font-weight: 700; font-size: 1.2rem; }
      #result.error { display: block; background: #ffcccc; color: #a00; }
      #address { margin-top: 24px; color: #5a827e; font-weight: 600; text-align: center; }
      #map { height: 70vh; width: 100%; margin-bottom: 2rem; }
      details { width: 90%; margin: 0 auto 2rem auto; padding: 1rem; }
      summary { font-weight: 700; color: #5a827e; cursor: pointer; }
      table { width: 100%; border-collapse: collapse; margin-top: 16px; }
      th, td { border: 1px solid #84ae92; padding: 8px; }
      th { background: #faffca; }
    </style>
  </head>
  <body>
    <div id="layout">
      <div id="panel">
        <h1>California House Price Predictor</h1>
        <p class="blurb">Enter the features of a California census block, or pick its location on the map, and the prediction service estimates the median house value.</p>
        <form id="form">
          <div id="fields"></div>
          <span class="label">Ocean Proximity</span>
          <select id="ocean_proximity" name="ocean_proximity"></select>
          <button id="submit" type="submit">Predict Price</button>
          <button id="reset" type="button" class="secondary">Reset</button>
          <div id="result"></div>
        </form>
        <div id="address">Address (Lat, Lon): <span id="coords"></span></div>
      </div>
      <div id="side">
        <div id="map"></div>
        <details>
          <summary>Show Sample Dataset</summary>
          <div style="overflow-x: auto;"><table id="samples"></table></div>
        </details>
      </div>
    </div>
    <script>
      const inputs = {};
      let session = null;
      let map = null;
      let marker = null;
      // Edits and map selections are applied one at a time, in event order.
      let queue = Promise.resolve();

      async function api(path, body) {
        let init = {};
        if (body === null) init = { method: "POST" };
        else if (body !== undefined) init = { method: "POST", headers: { "Content-Type": "application/json" }, body: JSON.stringify(body) };
        const res = await fetch(path, init);
        if (!res.ok) throw new Error((await res.text()) || `request failed (${res.status})`);
        return res.json();
      }

      function sessionPath(action) {
        return action ? `/api/sessions/${session}/${action}` : `/api/sessions/${session}`;
      }

      function show(value) {
        return value === null || value === undefined ? "" : value;
      }

      function showError(err) {
        const result = document.getElementById("result");
        result.className = "error";
        result.textContent = err.message;
      }

      function renderResult(view) {
        const result = document.getElementById("result");
        result.className = view.prediction !== null ? "price" : view.error !== null ? "error" : "";
        result.textContent = view.display || "";
      }

      function render(view) {
        for (const [name, pair] of Object.entries(inputs)) {
          const value = show(view.record[name]);
          pair.range.value = value;
          if (document.activeElement !== pair.number) pair.number.value = value;
        }
        document.getElementById("ocean_proximity").value = view.record.ocean_proximity;
        document.getElementById("coords").textContent =
          `${show(view.record.latitude)}, ${show(view.record.longitude)}`;
        renderResult(view);
        if (marker) {
          marker.setLatLng(view.marker);
          marker.setPopupContent(`Selected Location<br />Lat: ${show(view.record.latitude)}, Lon: ${show(view.record.longitude)}`);
        }
      }

      function enqueue(action, body) {
        queue = queue.then(() => api(sessionPath(action), body)).then(render).catch(showError);
        return queue;
      }

      function edit(field, value) {
        return enqueue("field", { field, value });
      }

      function geo(lat, lon, source) {
        return enqueue("geo", { lat, lon, source });
      }

      function buildFields(meta) {
        const container = document.getElementById("fields");
        for (const f of meta.fields) {
          const row = document.createElement("div");
          row.className = "row";
          const label = document.createElement("label");
          label.textContent = f.label;
          const range = document.createElement("input");
          const number = document.createElement("input");
          range.type = "range";
          number.type = "number";
          for (const el of [range, number]) {
            el.name = f.name;
            el.min = f.min;
            el.max = f.max;
            el.step = f.kind === "integer" ? 1 : "any";
          }
          range.addEventListener("input", (e) => edit(f.name, e.target.value));
          number.addEventListener("change", (e) => edit(f.name, e.target.value));
          row.append(label, range, number);
          container.appendChild(row);
          inputs[f.name] = { range, number };
        }
        const select = document.getElementById("ocean_proximity");
        for (const opt of meta.ocean_options) {
          const option = document.createElement("option");
          option.value = opt;
          option.textContent = opt;
          select.appendChild(option);
        }
        select.addEventListener("change", (e) => edit("ocean_proximity", e.target.value));
      }

      function buildMap(meta, view) {
        map = L.map("map", {
          center: view.marker,
          zoom: meta.map.zoom,
          minZoom: meta.map.min_zoom,
          maxZoom: meta.map.max_zoom,
          maxBounds: meta.map.bounds,
          scrollWheelZoom: true,
          dragging: true,
        });
        L.tileLayer("https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png", {
          attribution: "&copy; OpenStreetMap contributors",
        }).addTo(map);
        marker = L.marker(view.marker, { draggable: true }).addTo(map).bindPopup("Selected Location");
        map.on("click", (e) => geo(e.latlng.lat, e.latlng.lng, "map_click"));
        marker.on("dragend", () => {
          const { lat, lng } = marker.getLatLng();
          geo(lat, lng, "marker_drag");
        });
      }

      function buildSamples(rows) {
        const table = document.getElementById("samples");
        if (!rows.length) return;
        const cols = Object.keys(rows[0]);
        const head = document.createElement("tr");
        for (const col of cols) {
          const th = document.createElement("th");
          th.textContent = col;
          head.appendChild(th);
        }
        table.appendChild(head);
        for (const row of rows) {
          const tr = document.createElement("tr");
          for (const col of cols) {
            const td = document.createElement("td");
            td.textContent = row[col];
            tr.appendChild(td);
          }
          table.appendChild(tr);
        }
      }

      // A submission waits for queued edits but does not hold up later ones.
      document.getElementById("form").addEventListener("submit", (e) => {
        e.preventDefault();
        queue
          .then(() => api(sessionPath("submit"), null))
          .then(renderResult)
          .catch(showError);
      });

      document.getElementById("reset").addEventListener("click", () => {
        enqueue("reset", null);
      });

      (async () => {
        try {
          // Every page load starts from a fresh, unset record.
          const [meta, view, samples] = await Promise.all([
            api("/api/meta"),
            api("/api/sessions", null),
            api("/api/samples"),
          ]);
          session = view.session;
          buildFields(meta);
          buildMap(meta, view);
          buildSamples(samples);
          render(view);
        } catch (err) {
          showError(err);
        }
      })();
    </script>
  </body>
</html>
"##;
