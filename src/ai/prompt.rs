//! Fixed instruction prompts sent to the vision model.

/// Classification prompt for a single waste photo.
pub const CLASSIFY_WASTE: &str = r#"You are an expert in waste management, environmental sustainability, and recycling. Analyze the provided image and classify the waste.

Instructions:
- Decide whether the image actually shows waste or litter. Set "imageType" to false if it does not.
- Identify the type of waste (e.g., plastic, paper, glass, metal, organic, hazardous, mixed, etc.).
- Estimate the quantity in kg or liters.
- Assess your confidence level as a number between 0 and 1.
- Provide detailed information on the following aspects:
  1. Decomposition Time: How long this waste takes to degrade in the environment.
  2. Common Sources: Where this type of waste typically originates.
  3. Environmental Impact: How this waste affects nature, pollution, and wildlife.
  4. Health Hazards: Risks for humans, such as toxicity, infections, or air pollution.
  5. Carbon Footprint: Contribution to CO2 emissions and climate change.
  6. Economic Impact: The financial burden or benefits of managing this waste.
  7. Waste Reduction Strategies: How to minimize the generation of this waste.
  8. Recycling/Disposal Methods: Best practices for handling, recycling, or safely disposing of this waste.
  9. Legislation & Regulations: Any existing laws or guidelines related to proper waste disposal.

Response Format:
Return ONLY a valid JSON object without any explanations or extra text, for example:

{
  "imageType": true,
  "wasteType": "Plastic waste",
  "quantity": "Approximately 15 kg",
  "confidence": 0.85,
  "decompositionTime": "100-1000 years",
  "commonSources": "A paragraph.",
  "environmentalImpact": "A paragraph.",
  "healthHazards": "A paragraph.",
  "carbonFootprint": "A paragraph.",
  "economicImpact": "A paragraph.",
  "wasteReductionStrategies": "A paragraph.",
  "recyclingDisposalMethods": "A paragraph.",
  "legislationRegulations": "A paragraph."
}

Give every key except imageType, wasteType, confidence and quantity as a detailed paragraph string."#;

/// Comparison prompt for the before (first) and after (second) photos.
pub const COMPARE_CLEANUP: &str = r#"You are an expert in waste management and environmental analysis. Analyze the two images below.

Instructions:
- Determine if both images are from the same place.
- If yes, compare the state of the location:
  - Was there waste in the first image?
  - Has the waste been cleaned in the second image?
  - Briefly describe the type of waste and the cleanup status.

Return a JSON object in this format:

{
  "sameLocation": true or false,
  "firstImageHasWaste": true or false,
  "cleanupStatus": "fully cleaned" or "partially cleaned" or "not cleaned",
  "wasteType": "plastic" or "mixed" or etc,
  "comments": "Short paragraph summarizing your findings"
}

Return ONLY the JSON object, no other text or explanation."#;
