//! Prompt text for each conversation phase.
//!
//! System instructions are fixed Korean text; user prompts are assembled from
//! session state. Keeping them here lets tests recognize which phase a
//! language-model call belongs to.

use domain::{Emotion, Session};

/// Free movie chat after a recommendation
pub const CHAT_SYSTEM_PROMPT: &str = "\
너는 감정 기반 영화 추천 이후의 '영화 전문 챗봇'이다.
이미 사용자의 감정을 바탕으로 1차 영화 추천은 완료된 상태다.

다음 규칙을 따른다:
1. 감정 분석이나 감정 재판단은 하지 않는다.
2. 이전에 추천한 영화와 대화 맥락을 기억한다.
3. 사용자가 영화가 마음에 들지 않는다고 하면,
   조건(장르, 분위기, 국가, 속도감, 최근작 등)을 바탕으로
   새로운 영화를 추천할 수 있다.
4. 영화 추천, 비교, 설명, 질문은 자유롭게 허용된다.
5. 영화와 무관한 주제로 벗어나지 않는다.

너의 역할은 영화에 대해 대화하고 추천하는 것이다.";

/// One clarifying question per exploration turn
pub const EXPLORE_SYSTEM_PROMPT: &str = "\
너는 감정 요약을 위한 3턴짜리 감정 탐색 챗봇이다.
이미 첫 질문(오늘 기분이 어때?)은 끝난 상태다.

규칙:
1. 지금까지의 대화를 하나의 상황으로 이해한다.
2. 사용자의 말을 그대로 반복하거나 재진술하지 않는다.
3. 상담사처럼 말하지 않는다.
4. 현재 감정 상태를 더 분명히 하기 위한 질문만 한다.
5. 질문은 짧고 자연스럽게 하나만 한다.
6. 영화, 추천, 활동, 조언은 절대 언급하지 않는다.";

/// One-sentence emotional-state summary
pub const SUMMARY_SYSTEM_PROMPT: &str = "\
너는 감정 분류 모델에 입력될 요약 문장을 생성한다.
다음 규칙을 반드시 지켜라:

1. 결과는 반드시 한 문장이다.
2. 사용자의 현재 감정 상태만 서술한다.
3. 추측, 평가, 해석, 조언을 포함하지 않는다.
4. '사용자는', '말했다', '느끼는 것 같다' 같은 표현을 쓰지 않는다.
5. 영화, 추천, 활동, 원인 분석은 포함하지 않는다.

형식 예시:
- 전반적으로 기분이 좋고 특별한 사건은 없다고 느끼고 있다.
- 이유 없이 무기력하고 의욕이 낮은 상태다.";

/// Reply when the catalog produced nothing
pub const NO_MOVIES_REPLY: &str = "추천할 영화를 찾지 못했어.";

/// Reply accompanying a successful recommendation
pub const SUMMARY_READY_REPLY: &str = "지금까지 이야기한 걸 정리해봤어.";

const EMOTION_PROMPT_HEADER: &str = "\
너는 사용자의 감정을 분석한다.
아래 7개 중 하나만 반드시 선택해서 단어 하나로만 답해라.";

/// Seven-way classification; lists every label, one per line
pub fn emotion_system_prompt() -> String {
    let labels: Vec<&str> = Emotion::ALL.iter().map(|e| e.label()).collect();
    format!(
        "{}\n\n{}\n\n다른 말, 설명, 문장은 절대 금지한다.",
        EMOTION_PROMPT_HEADER,
        labels.join("\n")
    )
}

pub fn is_emotion_system_prompt(system: &str) -> bool {
    system.starts_with(EMOTION_PROMPT_HEADER)
}

/// Stored summary and recommendations plus the new utterance
pub fn chat_user_prompt(session: &Session, text: &str) -> String {
    format!(
        "이전 대화 요약:\n{}\n\n추천한 영화 목록:\n{}\n\n사용자 발화:\n{}",
        session.summary.as_deref().unwrap_or_default(),
        session.recommended_movies.join(", "),
        text
    )
}

pub fn explore_user_prompt(session: &Session) -> String {
    format!("지금까지의 사용자 발화:\n{}", session.transcript())
}

pub fn summary_user_prompt(session: &Session) -> String {
    session.transcript()
}
