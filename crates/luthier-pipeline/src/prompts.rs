//! Prompt text for every inference round trip.
//!
//! Each prompt asks for a bare JSON object. Replies are still run through
//! [`luthier_core::extract_json_object`] because models wrap JSON in prose or
//! code fences anyway.

use luthier_core::InstrumentIdentity;

// ============================================================================
// IMAGE IDENTIFICATION
// ============================================================================

/// Stage 1: read only the headstock text.
pub const HEADSTOCK_PROMPT: &str = r#"Look at the guitar photo(s). Focus ONLY on the headstock (the top of the neck where the tuners are). Read ALL text visible on the headstock: brand name, model name, any other words. The text may run vertically, diagonally, curved, sideways, or along the edge of the headstock. Common headstock brand texts include Fender, Gibson, Nash, Nashguitars, Suhr, PRS, Tom Anderson, K-Line, LSL, Haar, Danocaster, Heritage, Epiphone, Squier, Gretsch and Ibanez.

Return ONLY a JSON object: {"headstock_text": ["word1", "word2"], "brand_read": "the brand name you read"}.
If you cannot read any text, return {"headstock_text": [], "brand_read": "unknown"}."#;

/// Stage 2: full specification analysis.
pub const ANALYSIS_PROMPT: &str = r#"You are a guitar identification expert with deep knowledge of electric, acoustic and bass guitars from every era and manufacturer, including boutique builders, small-batch makers and relic/reproduction specialists.

Analyze the provided guitar photo(s) and identify the instrument as precisely as possible.

## HEADSTOCK TEXT COMES FIRST

Read ANY text on the headstock before anything else. The headstock logo is the most reliable identifier and overrides body-shape assumptions. Many boutique builders replicate classic body shapes (Strat, Tele, Les Paul, SG); the headstock text is what tells them apart from the original brands.

Headstock text may be vertical, diagonal, upside down or printed along the edge of the neck. Some brands (notably Nash/Nashguitars) print the logo vertically down the headstock face. Read text in every orientation. If it reads "Nashguitars", "Nash", "Suhr", "Anderson", "K-Line" or any other brand name, that IS the brand, however much the body resembles a Fender or Gibson.

IDENTIFICATION PRIORITY ORDER:
1. HEADSTOCK TEXT/LOGO: always the definitive brand identifier.
2. HEADSTOCK SHAPE: narrows the brand without readable text (6-in-line vs 3+3, pointed vs rounded).
3. BODY SHAPE: identifies the model style only, NEVER the brand.
4. PICKUPS & HARDWARE: pickup types, bridge style, control layout, knobs.
5. FINISH & AGING: color, burst pattern, binding, relicing (heavy relicing may indicate a boutique builder).
6. SERIAL NUMBER: note it if visible.

## BOUTIQUE AND REPRODUCTION BUILDERS

If the headstock text matches any of these, use that brand and never default to Fender or Gibson.

Fender-style builders: Nash Guitars (S-63, S-57, T-63, T-52, JM-63; heavy aging), Suhr (Classic S, Classic T, Standard, Modern), Tom Anderson (Drop Top, Classic, Hollow Drop Top), K-Line (Springfield, Springfield S, Truxton), LSL Instruments (Saticoy, Silverlake), Haar, Danocaster, Melancon (Pro Artist, Custom Artist), Don Grosh (ElectraJet, NOS Retro, Bent Top), RS Guitarworks (Slab, Old Friend), Fano (SP6, JM6, TC6), Novo (Serus S, Serus T, Solus), Asher, Palir, Macmull (S-Classic, T-Classic), Mario Guitars, Waterslide.

Gibson-style builders: Heritage (H-150, H-535, H-530), Knaggs (Kenai, Severn, Chesapeake), Nik Huber (Dolphin, Orca, Krautster), Collings (City Limits, CL, I-35, 290), Eastman (SB59, T486, AR372CE).

Other makers: PRS, Kiesel/Carvin, Reverend, Rivolta, Duesenberg, Hagstrom, Italia, Gordon Smith, Patrick James Eggle, Vigier, Caparison, Mayones, Strandberg.

## RELICING

Heavy wear with a too-even distressing pattern usually means a boutique relic build (Nash, Fano, Danocaster) rather than a genuinely old instrument. Say so in "notes".

## SPECIFICATIONS

Once identified, use your knowledge of that brand and model to fill in EVERY specification field, not just what is visible. Give each field a confidence that reflects how sure you are of the exact model variant.

Return ONLY a valid JSON object (no markdown, no explanation) with this structure:
{
  "confidence": <overall confidence 0.0-1.0>,
  "brand": { "value": "<brand name>", "confidence": <0.0-1.0> },
  "model": { "value": "<specific model name>", "confidence": <0.0-1.0> },
  "year": { "value": "<year or range like 2020-2024>", "confidence": <0.0-1.0> },
  "country": { "value": "<country of manufacture>", "confidence": <0.0-1.0> },
  "bodyType": { "value": "<Solid Body|Semi-Hollow|Hollow Body|Acoustic|Classical|Bass|12-String>", "confidence": <0.0-1.0> },
  "finish": { "value": "<finish description>", "confidence": <0.0-1.0> },
  "color": { "value": "<primary color>", "confidence": <0.0-1.0> },
  "topWood": { "value": "<top wood or N/A>", "confidence": <0.0-1.0> },
  "bodyWood": { "value": "<body wood>", "confidence": <0.0-1.0> },
  "neckWood": { "value": "<neck wood>", "confidence": <0.0-1.0> },
  "fretboardWood": { "value": "<fretboard wood>", "confidence": <0.0-1.0> },
  "neckProfile": { "value": "<C, D, V, slim taper, 60s...>", "confidence": <0.0-1.0> },
  "scaleLength": { "value": "<inches, e.g. 24.75, 25.5>", "confidence": <0.0-1.0> },
  "frets": { "value": "<number of frets>", "confidence": <0.0-1.0> },
  "pickupConfig": { "value": "<HH, HSS, SSS, HSH, P90...>", "confidence": <0.0-1.0> },
  "pickups": { "value": "<pickup models>", "confidence": <0.0-1.0> },
  "controls": { "value": "<e.g. 2V 2T 3-way toggle>", "confidence": <0.0-1.0> },
  "bridge": { "value": "<bridge model>", "confidence": <0.0-1.0> },
  "bridgeType": { "value": "<Fixed|Tremolo|Bigsby|Floyd Rose|Wrap-around|Tune-o-matic>", "confidence": <0.0-1.0> },
  "tuners": { "value": "<tuner type/brand>", "confidence": <0.0-1.0> },
  "nutMaterial": { "value": "<Bone, TUSQ, Plastic, Graph Tech...>", "confidence": <0.0-1.0> },
  "hardwareFinish": { "value": "<Chrome|Nickel|Gold|Black|Aged Nickel|Satin>", "confidence": <0.0-1.0> },
  "notes": "<the identification reasoning: headstock reading, body shape, hardware, finish, caveats>",
  "alternatives": [
    { "brand": "<brand>", "model": "<model>", "confidence": <0.0-1.0>, "reason": "<why it could also be this>" }
  ]
}

## ALTERNATIVES

Always provide 2-4 alternatives, even when confident: sibling models from the same brand, boutique builders making the same body style, other years or variants. Order them by confidence, highest first. Each must differ meaningfully from the primary identification."#;

/// Soft-override hint appended to [`ANALYSIS_PROMPT`] when the pre-pass read a brand.
pub fn brand_hint(headstock_brand: &str) -> String {
    format!(
        "\n\nIMPORTANT: A preliminary headstock text scan detected the brand as \"{}\". \
         Use this as your PRIMARY brand identification unless you have very strong evidence \
         it is wrong. Do NOT override it with a body-shape guess.",
        headstock_brand
    )
}

/// The stage 2 prompt, with the hint when an anchor brand exists.
pub fn analysis_prompt(headstock_brand: Option<&str>) -> String {
    match headstock_brand {
        Some(brand) => format!("{}{}", ANALYSIS_PROMPT, brand_hint(brand)),
        None => ANALYSIS_PROMPT.to_string(),
    }
}

// ============================================================================
// CONTENT EXTRACTION
// ============================================================================

/// Identify phase system prompt.
pub const IDENTIFY_SYSTEM: &str = r#"You are a guitar identification API. Extract guitar identities from the provided content.
RULES:
- Respond with ONLY valid JSON
- Capture the FULL narrative from the original content for each guitar in "context"
- If no guitars are found, return: {"guitars":[],"error":"reason"}

RESPOND WITH:
{
  "guitars": [
    {
      "brand": "", "model": "", "year": null, "year_range": "",
      "serial_number": "", "finish": "", "category": "",
      "production_status": "current|discontinued|limited_edition|custom_shop",
      "context": "THE COMPLETE NARRATIVE",
      "_famous_owner": "", "_nickname": "",
      "_notable_events": [], "_ownership_history": [], "_modification_history": []
    }
  ],
  "source_type": "article|video|social_media|user_text|mixed",
  "original_text": "preserved verbatim",
  "summary": "one line"
}"#;

/// Identify phase user prompt.
pub fn identify_prompt(content: &str) -> String {
    format!("Extract all guitars mentioned in this content:\n\n{}", content)
}

/// Enrich phase system prompt.
pub const ENRICH_SYSTEM: &str = r#"You are a guitar specialist. For the provided guitar:
1. Give its complete factory specifications from your knowledge of the manufacturer's catalog
2. Write a 150-500 word narrative story centered on the owner's experience and the guitar's history

For every specification say whether the value was stated in the original content ("observed") or comes from your general knowledge ("inferred"), and how confident you are.

RESPOND WITH ONLY VALID JSON:
{
  "body_style": "", "instrument_type": "", "finish": "",
  "finish_options": [],
  "specifications": {
    "<spec_name>": { "value": "", "confidence": 0.0, "provenance": "observed|inferred" },
    "_confidence": { "<spec_name>": 0.0 },
    "_spec_sources": { "<spec_name>": ["where the value came from"] }
  },
  "story": "narrative",
  "_images": [],
  "extraction_confidence": "high|medium|low",
  "fields_requiring_verification": []
}"#;

/// Enrich phase user prompt for one identity.
pub fn enrich_prompt(identity: &InstrumentIdentity, original_content: &str) -> String {
    format!(
        "Guitar to enrich:\n\
         Brand: {}\n\
         Model: {}\n\
         Year: {}\n\
         Serial: {}\n\
         Finish: {}\n\
         Context: {}\n\
         \n\
         Original content for reference:\n\
         {}\n\
         \n\
         Give the factory specifications and write the narrative based on the owner's \
         experience described in the content.",
        identity.brand,
        identity.model,
        identity.year_label(),
        identity.serial_number.as_deref().unwrap_or(""),
        identity.finish.as_deref().unwrap_or(""),
        identity.context,
        original_content,
    )
}
